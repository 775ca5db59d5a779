use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::session::Session;

pub async fn handle_pwd_command(
    writer: Arc<Mutex<FtpStream>>,
    session: Arc<Mutex<Session>>,
) -> Result<(), std::io::Error> {
    let cwd = session.lock().await.cwd.clone();
    let response = format!("257 \"{}\" is current directory\r\n", cwd);
    send_response(&writer, response.as_bytes()).await
}
