use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::resolve_arg;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the RNTO command: complete the rename started by RNFR.
pub async fn handle_rnto_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.trim().is_empty() {
        return send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await;
    }

    let from = match session.lock().await.rename_from.take() {
        Some(from) => from,
        None => {
            warn!("RNTO without a preceding RNFR");
            return send_response(&writer, b"503 Bad sequence of commands.\r\n").await;
        }
    };

    let to = resolve_arg(&session, &arg).await;
    match server.fs.rename(&from, &to).await {
        Ok(()) => {
            info!("Renamed {:?} to {:?}", from, to);
            send_response(&writer, b"250 File renamed successfully.\r\n").await
        }
        Err(e) => {
            warn!("RNTO failed for {:?} -> {:?}: {}", from, to, e);
            let reply = format!("550 Error: {}\r\n", e);
            send_response(&writer, reply.as_bytes()).await
        }
    }
}
