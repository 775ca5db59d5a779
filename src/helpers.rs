use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;

/// Sends a reply on the control connection.
pub async fn send_response(
    writer: &Arc<Mutex<FtpStream>>,
    message: &[u8],
) -> Result<(), std::io::Error> {
    let mut writer = writer.lock().await;
    writer.write_all(message).await?;
    writer.flush().await?;
    Ok(())
}
