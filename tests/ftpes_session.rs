mod common;

use common::*;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::client::{ServerCertVerified, ServerCertVerifier};
use tokio_rustls::rustls::{self, Certificate, ServerName};
use tokio_rustls::TlsConnector;

struct TrustAnything;

impl ServerCertVerifier for TrustAnything {
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

fn test_connector() -> TlsConnector {
    let config = rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(TrustAnything))
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

async fn tls_handshake(stream: TcpStream) -> TlsStream<TcpStream> {
    let name = ServerName::try_from("ftp-data").unwrap();
    test_connector().connect(name, stream).await.unwrap()
}

#[tokio::test]
async fn auth_tls_upgrades_the_control_connection() {
    let (addr, _root) = start_server("ftpes", (42000, 42010), true).await;
    let mut client = connect(addr).await;

    let reply = client.cmd("AUTH TLS").await;
    assert_eq!(reply, "234 AUTH command ok. Expecting TLS Negotiation.");

    let tls_stream = tls_handshake(client.into_inner()).await;
    let mut client = TestClient::new(tls_stream);

    // The session continues encrypted.
    login(&mut client).await;
    assert_eq!(client.cmd("PWD").await, "257 \"/\" is current directory");

    client.send("FEAT").await;
    let lines = client.read_until("211 End").await;
    assert!(lines.contains(&String::from(" AUTH TLS")));
    assert!(lines.contains(&String::from(" PROT")));
}

#[tokio::test]
async fn auth_rejects_other_mechanisms() {
    let (addr, _root) = start_server("ftpes-badmech", (42020, 42030), true).await;
    let mut client = connect(addr).await;

    let reply = client.cmd("AUTH KERBEROS").await;
    assert_eq!(reply, "504 AUTH command not implemented for this type");
}

#[tokio::test]
async fn auth_tls_without_config_is_unsupported() {
    let (addr, _root) = start_server("ftpes-notls", (42040, 42050), false).await;
    let mut client = connect(addr).await;

    let reply = client.cmd("AUTH TLS").await;
    assert_eq!(reply, "500 TLS not supported");
}

#[tokio::test]
async fn prot_p_wraps_the_data_channel() {
    let (addr, root) = start_server("ftpes-protp", (42060, 42100), true).await;
    let mut client = connect(addr).await;

    let reply = client.cmd("AUTH TLS").await;
    assert_eq!(reply, "234 AUTH command ok. Expecting TLS Negotiation.");
    let tls_stream = tls_handshake(client.into_inner()).await;
    let mut client = TestClient::new(tls_stream);

    login(&mut client).await;
    assert_eq!(client.cmd("PBSZ 0").await, "200 PBSZ set to 0.");
    assert_eq!(
        client.cmd("PROT P").await,
        "200 Data channel protection level set to P."
    );
    assert_eq!(client.cmd("TYPE I").await, "200 Type set to I");

    // Upload over an encrypted passive data connection.
    let reply = client.cmd("EPSV").await;
    let port = epsv_port(&reply);
    let data_tcp = open_data(port).await;
    client.send("STOR secret.bin").await;
    assert_eq!(client.read_line().await, "150 Opening data connection.");
    let mut data = tls_handshake(data_tcp).await;
    data.write_all(b"confidential payload").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert_eq!(client.read_line().await, "226 Transfer complete");

    assert_eq!(
        std::fs::read(root.join("secret.bin")).unwrap(),
        b"confidential payload"
    );

    // And back down again.
    let reply = client.cmd("EPSV").await;
    let port = epsv_port(&reply);
    let data_tcp = open_data(port).await;
    client.send("RETR secret.bin").await;
    assert_eq!(client.read_line().await, "150 Opening data connection.");
    let mut data = tls_handshake(data_tcp).await;
    let mut payload = Vec::new();
    data.read_to_end(&mut payload).await.unwrap();
    assert_eq!(payload, b"confidential payload");
    assert_eq!(client.read_line().await, "226 Transfer complete");
}
