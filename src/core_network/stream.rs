use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;

use crate::core_tls::{TlsConnection, TlsError};

/// A control or data socket, plain or TLS. The `Detached` state only exists
/// transiently while an `AUTH TLS` upgrade swaps the transport out.
pub enum FtpStream {
    Plain(TcpStream),
    Tls(Box<tokio_rustls::server::TlsStream<TcpStream>>),
    TlsClient(Box<tokio_rustls::client::TlsStream<TcpStream>>),
    Detached,
}

impl FtpStream {
    pub fn is_tls(&self) -> bool {
        matches!(self, FtpStream::Tls(_) | FtpStream::TlsClient(_))
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        match self {
            FtpStream::Plain(stream) => stream.peer_addr(),
            FtpStream::Tls(stream) => stream.get_ref().0.peer_addr(),
            FtpStream::TlsClient(stream) => stream.get_ref().0.peer_addr(),
            FtpStream::Detached => Err(io::ErrorKind::NotConnected.into()),
        }
    }

    /// Upgrades a plain stream to server-side TLS in place. On handshake
    /// failure the stream is left detached and the session must end.
    pub async fn upgrade_to_tls(&mut self, tls: &TlsConnection) -> Result<(), TlsError> {
        match std::mem::replace(self, FtpStream::Detached) {
            FtpStream::Plain(stream) => {
                let tls_stream = tls.accept_tls(stream).await?;
                *self = FtpStream::Tls(Box::new(tls_stream));
                Ok(())
            }
            other => {
                *self = other;
                Err(TlsError::TlsConfigError(String::from(
                    "control connection is already encrypted",
                )))
            }
        }
    }
}

impl AsyncRead for FtpStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            FtpStream::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
            FtpStream::TlsClient(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
            FtpStream::Detached => Poll::Ready(Ok(())),
        }
    }
}

impl AsyncWrite for FtpStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            FtpStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            FtpStream::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
            FtpStream::TlsClient(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
            FtpStream::Detached => Poll::Ready(Err(io::ErrorKind::NotConnected.into())),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            FtpStream::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
            FtpStream::TlsClient(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
            FtpStream::Detached => Poll::Ready(Ok(())),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            FtpStream::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
            FtpStream::TlsClient(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
            FtpStream::Detached => Poll::Ready(Ok(())),
        }
    }
}
