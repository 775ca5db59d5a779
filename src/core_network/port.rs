use log::debug;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::{DataChannel, Session};

/// Handles the PORT command: record the client-supplied IPv4 endpoint; the
/// dial happens when the transfer opens the data channel.
pub async fn handle_port_command(
    writer: Arc<Mutex<FtpStream>>,
    _server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let addr = match parse_port_argument(&arg) {
        Some(addr) => addr,
        None => {
            return send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n")
                .await;
        }
    };

    let mut session = session.lock().await;
    session.data_channel = DataChannel::Active(addr);
    drop(session);

    debug!("Active data endpoint recorded: {}", addr);
    send_response(&writer, b"200 PORT command successful.\r\n").await
}

/// Handles the EPRT command (`|1|ip|port|` for IPv4, `|2|ip|port|` for IPv6).
pub async fn handle_eprt_command(
    writer: Arc<Mutex<FtpStream>>,
    _server: Arc<FtpServer>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let addr = match parse_eprt_argument(&arg) {
        Some(addr) => addr,
        None => {
            return send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n")
                .await;
        }
    };

    let mut session = session.lock().await;
    session.data_channel = DataChannel::Active(addr);
    drop(session);

    debug!("Active data endpoint recorded: {}", addr);
    send_response(&writer, b"200 EPRT command successful.\r\n").await
}

/// `h1,h2,h3,h4,p1,p2` with `port = p1 * 256 + p2`.
fn parse_port_argument(arg: &str) -> Option<SocketAddr> {
    let mut octets = [0u8; 6];
    let mut count = 0;
    for part in arg.trim().split(',') {
        if count == 6 {
            return None;
        }
        octets[count] = part.trim().parse().ok()?;
        count += 1;
    }
    if count != 6 {
        return None;
    }
    let ip = IpAddr::from([octets[0], octets[1], octets[2], octets[3]]);
    let port = u16::from(octets[4]) * 256 + u16::from(octets[5]);
    Some(SocketAddr::new(ip, port))
}

fn parse_eprt_argument(arg: &str) -> Option<SocketAddr> {
    let arg = arg.trim();
    let delimiter = arg.chars().next()?;
    let mut fields = arg.split(delimiter);
    fields.next()?; // leading empty field
    let protocol = fields.next()?;
    let host = fields.next()?;
    let port = fields.next()?;

    let ip: IpAddr = host.parse().ok()?;
    match (protocol, ip) {
        ("1", IpAddr::V4(_)) | ("2", IpAddr::V6(_)) => {}
        _ => return None,
    }
    let port: u16 = port.parse().ok()?;
    Some(SocketAddr::new(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_port_argument() {
        let addr = parse_port_argument("127,0,0,1,4,1").unwrap();
        assert_eq!(addr, "127.0.0.1:1025".parse().unwrap());
        assert!(parse_port_argument("127,0,0,1,4").is_none());
        assert!(parse_port_argument("127,0,0,1,4,1,9").is_none());
        assert!(parse_port_argument("a,b,c,d,e,f").is_none());
    }

    #[test]
    fn parses_eprt_argument() {
        let v4 = parse_eprt_argument("|1|132.235.1.2|6275|").unwrap();
        assert_eq!(v4, "132.235.1.2:6275".parse().unwrap());
        let v6 = parse_eprt_argument("|2|::1|6446|").unwrap();
        assert_eq!(v6, "[::1]:6446".parse().unwrap());
        assert!(parse_eprt_argument("|2|127.0.0.1|6275|").is_none());
        assert!(parse_eprt_argument("garbage").is_none());
    }
}
