use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::resolve_arg;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the SIZE command.
pub async fn handle_size_command(
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
        Ok((_, metadata)) if metadata.is_file() => {
            let reply = format!("213 {}\r\n", metadata.len());
            send_response(&writer, reply.as_bytes()).await
        }
        Ok(_) => send_response(&writer, b"550 Could not get file size.\r\n").await,
        Err(e) => {
            let reply = format!("550 Error: {}\r\n", e);
            send_response(&writer, reply.as_bytes()).await
        }
    }
}
