use log::debug;
use std::io;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::server::FtpServer;
use crate::session::{DataChannel, DataProtection, Session};

/// Opens the negotiated data connection and consumes the negotiation: the
/// session's data channel is reset to `Idle` whether or not the connection
/// succeeds. Under `PROT P` the socket is wrapped in TLS, server-side for
/// passive connections and client-side for active ones.
pub async fn open_data_stream(
    server: &Arc<FtpServer>,
    session: &Arc<Mutex<Session>>,
) -> io::Result<FtpStream> {
    let (channel, protection) = {
        let mut session = session.lock().await;
        (session.take_data_channel(), session.data_protection)
    };

    match channel {
        DataChannel::Idle => Err(io::Error::new(
            io::ErrorKind::NotConnected,
            "no data connection negotiated",
        )),
        DataChannel::Passive(listener) => {
            // A passive listener accepts exactly one connection, then drops.
            let (stream, addr) = listener.accept().await?;
            debug!("Accepted data connection from {}", addr);
            match protection {
                DataProtection::Clear => Ok(FtpStream::Plain(stream)),
                DataProtection::Private => {
                    let tls = require_tls(server)?;
                    let tls_stream = tls
                        .accept_tls(stream)
                        .await
                        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
                    Ok(FtpStream::Tls(Box::new(tls_stream)))
                }
            }
        }
        DataChannel::Active(addr) => {
            let stream = TcpStream::connect(addr).await?;
            debug!("Dialed active data connection to {}", addr);
            match protection {
                DataProtection::Clear => Ok(FtpStream::Plain(stream)),
                DataProtection::Private => {
                    let tls = require_tls(server)?;
                    let tls_stream = tls
                        .connect_tls(stream)
                        .await
                        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
                    Ok(FtpStream::TlsClient(Box::new(tls_stream)))
                }
            }
        }
    }
}

fn require_tls(server: &Arc<FtpServer>) -> io::Result<&crate::core_tls::TlsConnection> {
    server.tls.as_ref().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::Other,
            "PROT P requested but TLS is not configured",
        )
    })
}
