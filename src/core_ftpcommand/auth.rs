use log::{error, info};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the AUTH command: upgrades the control connection to TLS when an
/// explicit-TLS configuration is present (FTPES).
pub async fn handle_auth_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    _session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if !arg.trim().eq_ignore_ascii_case("TLS") {
        send_response(&writer, b"504 AUTH command not implemented for this type\r\n").await?;
        return Ok(());
    }

    let tls = match (&server.tls, server.explicit_tls) {
        (Some(tls), true) => tls.clone(),
        _ => {
            send_response(&writer, b"500 TLS not supported\r\n").await?;
            return Ok(());
        }
    };

    send_response(&writer, b"234 AUTH command ok. Expecting TLS Negotiation.\r\n").await?;

    // Everything after the 234 reply is part of the TLS handshake.
    let mut stream = writer.lock().await;
    match stream.upgrade_to_tls(&tls).await {
        Ok(()) => {
            info!("Control connection upgraded to TLS");
            Ok(())
        }
        Err(e) => {
            // The stream is detached; the next control read ends the session.
            error!("TLS upgrade failed: {}", e);
            Ok(())
        }
    }
}
