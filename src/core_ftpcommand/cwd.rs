use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_fs::path::{display_virtual, join_virtual, secure_path};
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the CWD command: resolve the argument against the working
/// directory, verify the target is a readable directory, then move there.
pub async fn handle_cwd_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let cwd = session.lock().await.cwd.clone();
    let requested = join_virtual(&cwd, arg.trim());

    let cleaned = match secure_path(&requested) {
        Ok(cleaned) => cleaned,
        Err(e) => {
            warn!("CWD rejected for {:?}: {}", requested, e);
            let reply = format!("550 Error: {}\r\n", e);
            return send_response(&writer, reply.as_bytes()).await;
        }
    };

    if let Err(e) = server.fs.check_dir(&cleaned).await {
        warn!("CWD failed for {:?}: {}", cleaned, e);
        let reply = format!("550 Error: {}\r\n", e);
        return send_response(&writer, reply.as_bytes()).await;
    }

    let new_cwd = display_virtual(&cleaned);
    session.lock().await.cwd = new_cwd.clone();
    info!("Working directory changed to {}", new_cwd);

    let reply = format!("250 Directory successfully changed to \"{}\"\r\n", new_cwd);
    send_response(&writer, reply.as_bytes()).await
}
