use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;

/// Handles the STRU command. Only file structure is implemented.
pub async fn handle_stru_command(
    writer: Arc<Mutex<FtpStream>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let arg = arg.trim();
    if arg.eq_ignore_ascii_case("F") {
        send_response(&writer, b"200 Structure set to F.\r\n").await
    } else {
        let reply = format!("504 Structure {} not implemented.\r\n", arg);
        send_response(&writer, reply.as_bytes()).await
    }
}
