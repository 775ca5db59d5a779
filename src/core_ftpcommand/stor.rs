use log::{error, info, warn};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::resolve_arg;
use crate::core_network::data::open_data_stream;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the STOR and APPE commands: receive the file over the data
/// channel and write it under the current transfer type. STOR truncates,
/// APPE appends.
pub async fn handle_stor_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
    append: bool,
) -> Result<(), std::io::Error> {
    if arg.trim().is_empty() {
        warn!("STOR command received with no argument");
        return send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await;
    }

    let path = resolve_arg(&session, &arg).await;
    let transfer_type = session.lock().await.transfer_type;

    send_response(&writer, b"150 Opening data connection.\r\n").await?;

    let mut data_stream = match open_data_stream(&server, &session).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("STOR data connection failed: {}", e);
            return send_response(&writer, b"425 Can't open data connection.\r\n").await;
        }
    };

    match server
        .fs
        .write_file(&path, &mut data_stream, transfer_type, append)
        .await
    {
        Ok(written) => {
            let _ = data_stream.shutdown().await;
            info!("Stored {} bytes at {:?}", written, path);
            send_response(&writer, b"226 Transfer complete\r\n").await
        }
        Err(e) => {
            let _ = data_stream.shutdown().await;
            error!("STOR failed for {:?}: {}", path, e);
            let reply = format!("550 Error writing to the file: {}\r\n", e);
            send_response(&writer, reply.as_bytes()).await
        }
    }
}
