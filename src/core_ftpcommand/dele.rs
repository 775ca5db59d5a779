use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::resolve_arg;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the DELE command.
pub async fn handle_dele_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.trim().is_empty() {
        return send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await;
    }

    let path = resolve_arg(&session, &arg).await;
    match server.fs.remove(&path).await {
        Ok(()) => {
            info!("Deleted {:?}", path);
            send_response(&writer, b"250 File deleted.\r\n").await
        }
        Err(e) => {
            warn!("DELE failed for {:?}: {}", path, e);
            let reply = format!("550 Error: {}\r\n", e);
            send_response(&writer, reply.as_bytes()).await
        }
    }
}
