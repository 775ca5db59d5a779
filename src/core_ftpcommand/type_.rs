use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_fs::TransferType;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::session::Session;

/// Handles the TYPE command. The transfer type is per-session state.
pub async fn handle_type_command(
    writer: Arc<Mutex<FtpStream>>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    match TransferType::from_code(arg.trim()) {
        Some(transfer_type) => {
            session.lock().await.transfer_type = transfer_type;
            let reply = format!("200 Type set to {}\r\n", transfer_type.code());
            send_response(&writer, reply.as_bytes()).await
        }
        None => send_response(&writer, b"500 Unknown type\r\n").await,
    }
}
