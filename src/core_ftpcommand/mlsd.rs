use log::{error, info};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::core_network::data::open_data_stream;
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the MLSD command: send the machine-readable listing of the
/// working directory over the data channel.
pub async fn handle_mlsd_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
) -> Result<(), std::io::Error> {
    let cwd = session.lock().await.cwd.clone();

    send_response(&writer, b"150 Here comes the directory listing.\r\n").await?;

    let mut data_stream = match open_data_stream(&server, &session).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("MLSD data connection failed: {}", e);
            return send_response(&writer, b"425 Can't open data connection.\r\n").await;
        }
    };

    let entries = match server.fs.dir(&cwd).await {
        Ok(entries) => entries,
        Err(e) => {
            error!("MLSD listing failed for {:?}: {}", cwd, e);
            let _ = data_stream.shutdown().await;
            let reply = format!("550 Error getting directory listing. {}\r\n", e);
            return send_response(&writer, reply.as_bytes()).await;
        }
    };

    for entry in &entries {
        let line = format!("{}\r\n", entry.fact_line);
        if let Err(e) = data_stream.write_all(line.as_bytes()).await {
            error!("MLSD write failed: {}", e);
            let _ = data_stream.shutdown().await;
            return send_response(&writer, b"426 Connection closed; transfer aborted.\r\n").await;
        }
    }
    data_stream.flush().await?;
    let _ = data_stream.shutdown().await;

    info!("Directory listing sent: {} entries in {}", entries.len(), cwd);
    send_response(&writer, b"226 Directory send OK.\r\n").await
}
