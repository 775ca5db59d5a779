use log::debug;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::session::Session;

/// Handles the ABOR command: tear down whatever data channel negotiation is
/// in flight.
pub async fn handle_abor_command(
    writer: Arc<Mutex<FtpStream>>,
    session: Arc<Mutex<Session>>,
) -> Result<(), std::io::Error> {
    let channel = session.lock().await.take_data_channel();
    drop(channel);
    debug!("Data channel reset by ABOR");
    send_response(&writer, b"226 ABOR command successful.\r\n").await
}
