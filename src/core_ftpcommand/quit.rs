use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;

/// Handles the QUIT command. The caller closes the control connection.
pub async fn handle_quit_command(writer: Arc<Mutex<FtpStream>>) -> Result<(), std::io::Error> {
    info!("Received QUIT, closing control connection");
    send_response(&writer, b"221 Goodbye.\r\n").await
}
