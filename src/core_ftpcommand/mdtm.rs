use log::warn;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_fs::FsError;
use crate::core_ftpcommand::utils::resolve_arg;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the MDTM command. One argument stats the file; the two-argument
/// form `MDTM <YYYYMMDDHHMMSS> <path>` sets mtime and atime.
pub async fn handle_mdtm_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let arg = arg.trim();
    if arg.is_empty() {
        return send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await;
    }

    match arg.split_once(' ') {
        None => {
            let path = resolve_arg(&session, arg).await;
            match server.fs.stat(&path).await {
                Ok((line, _)) => {
                    let reply = format!("213 {}\r\n", line);
                    send_response(&writer, reply.as_bytes()).await
                }
                Err(e) => {
                    let reply = format!("550 Error: {}\r\n", e);
                    send_response(&writer, reply.as_bytes()).await
                }
            }
        }
        Some((timestamp, path_arg)) => {
            let path = resolve_arg(&session, path_arg).await;
            match server.fs.modify_time(&path, timestamp).await {
                Ok(()) => {
                    let reply = format!("213 File modification time set to: {}\r\n", timestamp);
                    send_response(&writer, reply.as_bytes()).await
                }
                Err(FsError::InvalidTimeFormat(got)) => {
                    warn!("MDTM with malformed timestamp {:?}", got);
                    let reply = format!(
                        "501 Invalid time format got '{}' expected 'YYYYMMDDHHMMSS'\r\n",
                        got
                    );
                    send_response(&writer, reply.as_bytes()).await
                }
                Err(e) => {
                    let reply = format!("550 Error: {}\r\n", e);
                    send_response(&writer, reply.as_bytes()).await
                }
            }
        }
    }
}
