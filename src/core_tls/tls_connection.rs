use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::net::TcpStream;
use tokio_rustls::rustls::client::{ServerCertVerified, ServerCertVerifier};
use tokio_rustls::rustls::{self, Certificate, PrivateKey, ServerName};
use tokio_rustls::{TlsAcceptor, TlsConnector};

use crate::core_tls::error::TlsError;

/// FTP data channels are dialed by address; the peer presents whatever
/// certificate it likes, so the client side of a PROT P active-mode
/// connection performs no verification.
struct AcceptAnyCert;

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}

/// One certificate/key pair, usable as TLS server (control and passive data
/// sockets) and as TLS client (active-mode data dial under PROT P).
#[derive(Clone)]
pub struct TlsConnection {
    acceptor: TlsAcceptor,
    connector: TlsConnector,
}

impl TlsConnection {
    pub fn new(cert_file: &Path, key_file: &Path) -> Result<Self, TlsError> {
        let certs = load_certs(cert_file)?;
        let key = load_private_key(key_file)?;

        let server_config = rustls::ServerConfig::builder()
            .with_safe_defaults()
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|e| TlsError::TlsConfigError(e.to_string()))?;

        let client_config = rustls::ClientConfig::builder()
            .with_safe_defaults()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert))
            .with_no_client_auth();

        Ok(Self {
            acceptor: TlsAcceptor::from(Arc::new(server_config)),
            connector: TlsConnector::from(Arc::new(client_config)),
        })
    }

    pub async fn accept_tls(
        &self,
        stream: TcpStream,
    ) -> Result<tokio_rustls::server::TlsStream<TcpStream>, TlsError> {
        self.acceptor
            .accept(stream)
            .await
            .map_err(|e| TlsError::TlsHandshakeError(e.to_string()))
    }

    pub async fn connect_tls(
        &self,
        stream: TcpStream,
    ) -> Result<tokio_rustls::client::TlsStream<TcpStream>, TlsError> {
        let name = ServerName::try_from("ftp-data")
            .map_err(|e| TlsError::TlsConfigError(e.to_string()))?;
        self.connector
            .connect(name, stream)
            .await
            .map_err(|e| TlsError::TlsHandshakeError(e.to_string()))
    }
}

fn load_certs(cert_file: &Path) -> Result<Vec<Certificate>, TlsError> {
    let bytes = std::fs::read(cert_file)
        .map_err(|e| TlsError::CertificateLoadError(format!("{}: {}", cert_file.display(), e)))?;
    let certs = rustls_pemfile::certs(&mut &bytes[..])
        .map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
    if certs.is_empty() {
        return Err(TlsError::CertificateLoadError(format!(
            "no certificates found in {}",
            cert_file.display()
        )));
    }
    Ok(certs.into_iter().map(Certificate).collect())
}

fn load_private_key(key_file: &Path) -> Result<PrivateKey, TlsError> {
    let bytes = std::fs::read(key_file)
        .map_err(|e| TlsError::PrivateKeyLoadError(format!("{}: {}", key_file.display(), e)))?;

    let mut keys = rustls_pemfile::pkcs8_private_keys(&mut &bytes[..])
        .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
    if keys.is_empty() {
        keys = rustls_pemfile::rsa_private_keys(&mut &bytes[..])
            .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
    }

    match keys.pop() {
        Some(key) => Ok(PrivateKey(key)),
        None => Err(TlsError::PrivateKeyLoadError(String::from(
            "No private key found",
        ))),
    }
}
