use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::session::{DataProtection, Session};

/// Handles the PROT command: clear or private data-channel protection.
pub async fn handle_prot_command(
    writer: Arc<Mutex<FtpStream>>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let level = arg.trim().to_ascii_uppercase();
    let protection = match level.as_str() {
        "C" => DataProtection::Clear,
        "P" => DataProtection::Private,
        _ => {
            let reply = format!("504 Protection level {} not implemented.\r\n", level);
            return send_response(&writer, reply.as_bytes()).await;
        }
    };

    session.lock().await.data_protection = protection;
    let reply = format!("200 Data channel protection level set to {}.\r\n", level);
    send_response(&writer, reply.as_bytes()).await
}
