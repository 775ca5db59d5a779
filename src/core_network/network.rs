use anyhow::Result;
use log::{debug, error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::constants::MAX_CONTROL_LINE;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::handlers::{dispatch, Flow};
use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;
use crate::session::{session_id, Session};

/// Accept loop for one control listener. Each connection runs as its own
/// task; a panic inside a session is trapped and logged here, never
/// crashing the process.
pub async fn serve(
    server: Arc<FtpServer>,
    listener: TcpListener,
    implicit_tls: bool,
) -> Result<()> {
    info!("Server listening on {}", listener.local_addr()?);

    loop {
        let (socket, addr) = listener.accept().await?;
        info!("New connection from {}", addr);

        let server = Arc::clone(&server);
        tokio::spawn(async move {
            let task = tokio::spawn(handle_connection(server, socket, addr, implicit_tls));
            match task.await {
                Ok(Ok(())) => info!("Connection closed for {}", addr),
                Ok(Err(e)) => info!("Connection ended for {}: {}", addr, e),
                Err(e) if e.is_panic() => error!("Session for {} panicked: {}", addr, e),
                Err(e) => error!("Session task for {} failed: {}", addr, e),
            }
        });
    }
}

async fn handle_connection(
    server: Arc<FtpServer>,
    socket: TcpStream,
    addr: SocketAddr,
    implicit_tls: bool,
) -> std::io::Result<()> {
    let stream = if implicit_tls {
        let tls = server.tls.as_ref().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "implicit TLS listener without TLS")
        })?;
        let tls_stream = tls
            .accept_tls(socket)
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        FtpStream::Tls(Box::new(tls_stream))
    } else {
        FtpStream::Plain(socket)
    };

    let writer = Arc::new(Mutex::new(stream));
    let session = Arc::new(Mutex::new(Session::new(addr)));
    let id = session_id(addr);
    server.sessions.add(id.clone(), Arc::clone(&session));

    let result = control_loop(&server, &writer, &session).await;

    server.sessions.remove(&id);
    let mut guard = writer.lock().await;
    let _ = guard.shutdown().await;
    result
}

async fn control_loop(
    server: &Arc<FtpServer>,
    writer: &Arc<Mutex<FtpStream>>,
    session: &Arc<Mutex<Session>>,
) -> std::io::Result<()> {
    let banner = format!("220 {}\r\n", server.welcome_message);
    send_response(writer, banner.as_bytes()).await?;

    loop {
        let line = match read_control_line(writer).await? {
            Some(line) => line,
            None => return Ok(()),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (cmd, arg) = match trimmed.split_once(' ') {
            Some((cmd, arg)) => (cmd.to_ascii_uppercase(), arg.to_string()),
            None => (trimmed.to_ascii_uppercase(), String::new()),
        };
        if cmd == "PASS" {
            debug!("Received command: PASS ****");
        } else {
            debug!("Received command: {} {}", cmd, arg);
        }

        let command = match FtpCommand::from_str(&cmd) {
            Some(command) => command,
            None => {
                let reply = format!("500 Unknown command. {} {}\r\n", cmd, arg);
                send_response(writer, reply.as_bytes()).await?;
                continue;
            }
        };

        let authenticated = session.lock().await.authenticated;
        if !authenticated && !command.is_pre_auth() {
            send_response(
                writer,
                b"530 Not logged in, please login with USER and PASS first.\r\n",
            )
            .await?;
            continue;
        }

        // A pending RNFR is only honored by an immediately following RNTO.
        if !matches!(command, FtpCommand::RNFR | FtpCommand::RNTO) {
            session.lock().await.rename_from = None;
        }

        match dispatch(command, writer, server, session, arg).await? {
            Flow::Continue => {}
            Flow::Quit => return Ok(()),
        }
    }
}

/// Reads one CRLF-terminated line. `None` means the session should end
/// silently: EOF, an over-long line or bytes that are not valid UTF-8.
async fn read_control_line(
    stream: &Arc<Mutex<FtpStream>>,
) -> std::io::Result<Option<String>> {
    let mut guard = stream.lock().await;
    let mut line: Vec<u8> = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        let n = guard.read(&mut byte).await?;
        if n == 0 {
            return Ok(None);
        }
        if byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
        if line.len() > MAX_CONTROL_LINE {
            return Ok(None);
        }
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    match String::from_utf8(line) {
        Ok(text) => Ok(Some(text)),
        Err(_) => Ok(None),
    }
}
