use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;

/// Handles the MODE command. Only stream mode is implemented.
pub async fn handle_mode_command(
    writer: Arc<Mutex<FtpStream>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.trim().eq_ignore_ascii_case("S") {
        send_response(&writer, b"200 Mode set to S.\r\n").await
    } else {
        send_response(&writer, b"504 Unsupported mode.\r\n").await
    }
}
