use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;

pub async fn handle_noop_command(writer: Arc<Mutex<FtpStream>>) -> Result<(), std::io::Error> {
    send_response(&writer, b"200 NOOP ok.\r\n").await
}
