use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;

/// Handles the PBSZ command. TLS streams only support a buffer size of 0.
pub async fn handle_pbsz_command(
    writer: Arc<Mutex<FtpStream>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.trim() == "0" {
        send_response(&writer, b"200 PBSZ set to 0.\r\n").await
    } else {
        send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await
    }
}
