#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use ferrofsd::config::{Config, ServerConfig, TlsConfig, UserEntry};
use ferrofsd::core_network::network;
use ferrofsd::server::FtpServer;

pub const USER: &str = "alice";
pub const PASS: &str = "s3cret";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Starts a server on an ephemeral loopback port serving a fresh temp root.
/// Returns the control address and the served directory.
pub async fn start_server(
    tag: &str,
    pasv_range: (u16, u16),
    with_tls: bool,
) -> (SocketAddr, PathBuf) {
    let root = std::env::temp_dir().join(format!("ferrofsd-it-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();

    let config = Config {
        server: ServerConfig {
            ftp_addr: String::from("127.0.0.1:0"),
            root_dir: root.to_string_lossy().into_owned(),
            pasv_address: String::from("127.0.0.1"),
            pasv_min_port: pasv_range.0,
            pasv_max_port: pasv_range.1,
            welcome_message: String::from("Welcome to My FTP Server"),
        },
        tls: with_tls.then(|| TlsConfig {
            cert_file: fixture("cert.pem"),
            key_file: fixture("key.pem"),
            explicit: true,
            implicit_addr: None,
        }),
        sftp: None,
        users: vec![UserEntry {
            username: USER.to_string(),
            password: PASS.to_string(),
            allowed_nets: vec![String::from("127.0.0.0/8"), String::from("::1")],
        }],
    };

    let server = FtpServer::new(&config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = network::serve(Arc::clone(&server), listener, false).await;
    });
    (addr, root)
}

/// Minimal scripted FTP client for the control connection.
pub struct TestClient<T> {
    inner: BufReader<T>,
}

impl<T: AsyncRead + AsyncWrite + Unpin> TestClient<T> {
    pub fn new(stream: T) -> Self {
        Self {
            inner: BufReader::new(stream),
        }
    }

    /// Reads one reply line, CRLF stripped. Empty string on EOF.
    pub async fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.inner.read_line(&mut line).await.unwrap();
        line.trim_end().to_string()
    }

    /// Reads reply lines until one starts with `terminator`.
    pub async fn read_until(&mut self, terminator: &str) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await;
            let done = line.starts_with(terminator) || line.is_empty();
            lines.push(line);
            if done {
                return lines;
            }
        }
    }

    pub async fn send(&mut self, line: &str) {
        let data = format!("{}\r\n", line);
        self.inner.get_mut().write_all(data.as_bytes()).await.unwrap();
    }

    /// Sends a command and reads the single-line reply.
    pub async fn cmd(&mut self, line: &str) -> String {
        self.send(line).await;
        self.read_line().await
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

pub async fn connect(addr: SocketAddr) -> TestClient<TcpStream> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let mut client = TestClient::new(stream);
    let banner = client.read_line().await;
    assert!(banner.starts_with("220 "), "unexpected banner: {}", banner);
    client
}

pub async fn login<T: AsyncRead + AsyncWrite + Unpin>(client: &mut TestClient<T>) {
    let reply = client.cmd(&format!("USER {}", USER)).await;
    assert_eq!(reply, "331 Please specify the password");
    let reply = client.cmd(&format!("PASS {}", PASS)).await;
    assert_eq!(reply, "230 Login successful");
}

/// Extracts the port from a `229 Entering Extended Passive Mode (|||P|)`
/// reply.
pub fn epsv_port(reply: &str) -> u16 {
    let start = reply.find("(|||").expect("no EPSV port") + 4;
    let rest = &reply[start..];
    let end = rest.find('|').expect("unterminated EPSV port");
    rest[..end].parse().expect("bad EPSV port")
}

pub async fn open_data(port: u16) -> TcpStream {
    TcpStream::connect(("127.0.0.1", port)).await.unwrap()
}
