use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;

/// Handles the HELP command: echo the recognized command names.
pub async fn handle_help_command(writer: Arc<Mutex<FtpStream>>) -> Result<(), std::io::Error> {
    let mut response = String::from("214-The following commands are recognized.\r\n");
    for chunk in FtpCommand::all_names().chunks(8) {
        response.push(' ');
        response.push_str(&chunk.join(" "));
        response.push_str("\r\n");
    }
    response.push_str("214 Help OK.\r\n");
    send_response(&writer, response.as_bytes()).await
}
