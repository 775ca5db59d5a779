use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::handlers::Flow;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the PASS command: authenticate the pending username against the
/// registry, checking password and source address. Failure closes the
/// control connection.
pub async fn handle_pass_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<Flow, std::io::Error> {
    let (username, peer_ip) = {
        let session = session.lock().await;
        (
            session.pending_username.clone().unwrap_or_default(),
            session.peer_addr.ip(),
        )
    };

    match server.users.find(&username, &arg, peer_ip) {
        Ok(user) => {
            info!("User {} logged in from {}", username, peer_ip);
            let mut session = session.lock().await;
            session.user = Some(user);
            session.authenticated = true;
            drop(session);
            send_response(&writer, b"230 Login successful\r\n").await?;
            Ok(Flow::Continue)
        }
        Err(e) => {
            warn!("Login failed for {} from {}: {}", username, peer_ip, e);
            let reply = format!("530 Error: {}\r\n", e);
            send_response(&writer, reply.as_bytes()).await?;
            Ok(Flow::Quit)
        }
    }
}
