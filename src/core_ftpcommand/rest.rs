use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;

/// Handles the REST command. The marker is acknowledged for client
/// compatibility; stream transfers always start at offset zero.
pub async fn handle_rest_command(
    writer: Arc<Mutex<FtpStream>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let arg = arg.trim();
    if arg == "0" {
        return send_response(&writer, b"350 Ready for file transfer.\r\n").await;
    }
    match arg.parse::<u64>() {
        Ok(offset) => {
            let reply = format!("350 Restarting at {}. Send STORE or RETRIEVE.\r\n", offset);
            send_response(&writer, reply.as_bytes()).await
        }
        Err(_) => send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await,
    }
}
