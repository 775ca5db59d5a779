use log::{debug, error};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::{DataChannel, Session};

/// Handles the PASV command: listen on a port from the configured range and
/// advertise it together with the configured public IPv4 address.
pub async fn handle_pasv_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let listener = match listen_in_range(&server).await {
        Ok(listener) => listener,
        Err(response) => return send_response(&writer, response.as_bytes()).await,
    };
    let port = listener.local_addr()?.port();

    let ip = server.public_ip.octets();
    let response = format!(
        "227 Entering Passive Mode ({},{},{},{},{},{})\r\n",
        ip[0],
        ip[1],
        ip[2],
        ip[3],
        port / 256,
        port % 256
    );

    let mut session = session.lock().await;
    session.data_channel = DataChannel::Passive(listener);
    drop(session);

    debug!("Passive listener ready on port {}", port);
    send_response(&writer, response.as_bytes()).await
}

/// Handles the EPSV command: same negotiation as PASV, port-only reply.
pub async fn handle_epsv_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let listener = match listen_in_range(&server).await {
        Ok(listener) => listener,
        Err(response) => return send_response(&writer, response.as_bytes()).await,
    };
    let port = listener.local_addr()?.port();

    let mut session = session.lock().await;
    session.data_channel = DataChannel::Passive(listener);
    drop(session);

    debug!("Extended passive listener ready on port {}", port);
    let response = format!("229 Entering Extended Passive Mode (|||{}|)\r\n", port);
    send_response(&writer, response.as_bytes()).await
}

/// Binds the first free port in `[pasv_min_port, pasv_max_port]`, ascending.
/// Exhaustion is reported to the client; the control session stays alive.
async fn listen_in_range(server: &Arc<FtpServer>) -> Result<TcpListener, String> {
    for port in server.pasv_min_port..=server.pasv_max_port {
        match TcpListener::bind(("0.0.0.0", port)).await {
            Ok(listener) => return Ok(listener),
            Err(_) => continue,
        }
    }
    error!(
        "No available ports in passive range {}-{}",
        server.pasv_min_port, server.pasv_max_port
    );
    Err(format!(
        "500: Server error listening for data connection: no available ports found in range {}-{}\r\n",
        server.pasv_min_port, server.pasv_max_port
    ))
}
