use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::resolve_arg;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the MKD command: create the directory and any missing parents.
pub async fn handle_mkd_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.trim().is_empty() {
        return send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await;
    }

    let path = resolve_arg(&session, &arg).await;
    match server.fs.make_dir(&path).await {
        Ok(()) => {
            info!("Created directory {:?}", path);
            let reply = format!("257 \"{}\" created.\r\n", arg.trim());
            send_response(&writer, reply.as_bytes()).await
        }
        Err(e) => {
            warn!("MKD failed for {:?}: {}", path, e);
            let reply = format!("550 Error: {}\r\n", e);
            send_response(&writer, reply.as_bytes()).await
        }
    }
}
