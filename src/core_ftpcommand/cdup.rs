use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_ftpcommand::cwd::handle_cwd_command;
use crate::core_network::stream::FtpStream;
use crate::server::FtpServer;
use crate::session::Session;

/// Handles the CDUP command, equivalent to `CWD ..`.
pub async fn handle_cdup_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
) -> Result<(), std::io::Error> {
    handle_cwd_command(writer, server, session, String::from("..")).await
}
