use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::resolve_arg;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the STAT command: terse server status without an argument, a
/// single-file stat block with one.
pub async fn handle_stat_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.trim().is_empty() {
        let reply = format!(
            "211-FTP server status:\r\n Active sessions: {}\r\n211 End of status.\r\n",
            server.sessions.len()
        );
        return send_response(&writer, reply.as_bytes()).await;
    }

    let path = resolve_arg(&session, &arg).await;
    match server.fs.stat(&path).await {
        Ok((line, _)) => {
            let reply = format!(
                "213-Status of {}:\r\n {}\r\n213 End of status.\r\n",
                arg.trim(),
                line
            );
            send_response(&writer, reply.as_bytes()).await
        }
        Err(e) => {
            let reply = format!("550 Error: {}\r\n", e);
            send_response(&writer, reply.as_bytes()).await
        }
    }
}
