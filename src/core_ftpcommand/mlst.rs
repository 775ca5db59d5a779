use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::resolve_arg;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the MLST command: single-entry fact listing on the control
/// connection.
pub async fn handle_mlst_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let path = resolve_arg(&session, &arg).await;
    match server.fs.stat(&path).await {
        Ok((line, _)) => {
            let reply = format!("250-File details:\r\n {}\r\n250 End\r\n", line);
            send_response(&writer, reply.as_bytes()).await
        }
        Err(e) => {
            let reply = format!("550 Error: {}\r\n", e);
            send_response(&writer, reply.as_bytes()).await
        }
    }
}
