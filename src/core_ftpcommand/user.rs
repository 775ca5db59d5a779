use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::handlers::Flow;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the USER command: record the username and ask for the password.
/// An empty username is fatal to the session.
pub async fn handle_user_command(
    writer: Arc<Mutex<FtpStream>>,
    _server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<Flow, std::io::Error> {
    let username = arg.trim();
    if username.is_empty() {
        warn!("USER command without a user name");
        send_response(&writer, b"530 Error: User name not specified\r\n").await?;
        return Ok(Flow::Quit);
    }

    info!("Login attempt for user {}", username);
    let mut session = session.lock().await;
    session.pending_username = Some(username.to_string());
    drop(session);

    send_response(&writer, b"331 Please specify the password\r\n").await?;
    Ok(Flow::Continue)
}
