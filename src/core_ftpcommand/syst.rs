use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;

/// Handles the SYST command: report the server platform type.
pub async fn handle_syst_command(writer: Arc<Mutex<FtpStream>>) -> Result<(), std::io::Error> {
    let response = if cfg!(windows) {
        "215 WINDOWS Type: L8\r\n".to_string()
    } else if cfg!(unix) {
        "215 UNIX Type: L8\r\n".to_string()
    } else {
        format!("215 OS Type: {}\r\n", std::env::consts::OS)
    };
    send_response(&writer, response.as_bytes()).await
}
