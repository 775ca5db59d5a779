use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::resolve_arg;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the RNFR command: verify the source exists and remember it for
/// the RNTO that must follow.
pub async fn handle_rnfr_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.trim().is_empty() {
        return send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await;
    }

    let path = resolve_arg(&session, &arg).await;
    match server.fs.stat(&path).await {
        Ok(_) => {
            info!("Rename source recorded: {:?}", path);
            session.lock().await.rename_from = Some(path);
            send_response(&writer, b"350 File exists, ready for destination name\r\n").await
        }
        Err(e) => {
            warn!("RNFR failed for {:?}: {}", path, e);
            let reply = format!("550 Error: {}\r\n", e);
            send_response(&writer, reply.as_bytes()).await
        }
    }
}
