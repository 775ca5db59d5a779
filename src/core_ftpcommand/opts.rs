use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;

/// Handles the OPTS command. UTF-8 is always on; nothing else is tunable.
pub async fn handle_opts_command(
    writer: Arc<Mutex<FtpStream>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.trim().eq_ignore_ascii_case("UTF8 ON") {
        send_response(&writer, b"200 Always in UTF8 mode.\r\n").await
    } else {
        send_response(&writer, b"500 Unknown option.\r\n").await
    }
}
