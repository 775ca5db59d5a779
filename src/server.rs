use anyhow::{Context, Result};
use log::{info, warn};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::core_fs::LocalFs;
use crate::core_network::network;
use crate::core_tls::TlsConnection;
use crate::session::SessionManager;
use crate::users::UserRegistry;

/// Process-wide server state shared by every FTP session. Immutable after
/// startup apart from the user registry and the session table, which carry
/// their own locks.
pub struct FtpServer {
    pub fs: LocalFs,
    pub users: Arc<UserRegistry>,
    /// IPv4 address advertised in PASV replies.
    pub public_ip: Ipv4Addr,
    pub pasv_min_port: u16,
    pub pasv_max_port: u16,
    pub welcome_message: String,
    pub tls: Option<TlsConnection>,
    /// Whether AUTH TLS upgrades are accepted on the plain listener.
    pub explicit_tls: bool,
    pub sessions: SessionManager,
}

impl FtpServer {
    pub fn new(config: &Config) -> Result<Arc<Self>> {
        let fs = LocalFs::new(&config.server.root_dir)
            .with_context(|| format!("Failed to open root directory: {}", config.server.root_dir))?;

        let public_ip: Ipv4Addr = config
            .server
            .pasv_address
            .parse()
            .with_context(|| format!("Invalid pasv_address: {}", config.server.pasv_address))?;

        let (mut pasv_min_port, mut pasv_max_port) =
            (config.server.pasv_min_port, config.server.pasv_max_port);
        if pasv_min_port > pasv_max_port {
            warn!(
                "Passive port range {}-{} is inverted, swapping",
                pasv_min_port, pasv_max_port
            );
            std::mem::swap(&mut pasv_min_port, &mut pasv_max_port);
        }

        let users = Arc::new(UserRegistry::new());
        for entry in &config.users {
            users.add(&entry.username, &entry.password);
            for net in &entry.allowed_nets {
                if let Err(e) = users.add_net(&entry.username, net) {
                    warn!("Skipping allow-list entry for {}: {}", entry.username, e);
                }
            }
        }

        let tls = match &config.tls {
            Some(section) => Some(
                TlsConnection::new(&section.cert_file, &section.key_file)
                    .map_err(|e| anyhow::anyhow!(e.to_string()))
                    .context("Failed to load TLS certificate/key")?,
            ),
            None => None,
        };
        let explicit_tls = tls.is_some() && config.tls.as_ref().is_some_and(|t| t.explicit);

        Ok(Arc::new(Self {
            fs,
            users,
            public_ip,
            pasv_min_port,
            pasv_max_port,
            welcome_message: config.server.welcome_message.clone(),
            tls,
            explicit_tls,
            sessions: SessionManager::new(),
        }))
    }

    /// Binds the control listener for `addr`.
    pub async fn bind(addr: &str) -> Result<TcpListener> {
        TcpListener::bind(addr)
            .await
            .with_context(|| format!("error starting server on {}", addr))
    }

    /// Starts serving in the background and reports any startup error that
    /// surfaces within `window`.
    pub fn try_serve(
        self: &Arc<Self>,
        listener: TcpListener,
        implicit_tls: bool,
    ) -> impl std::future::Future<Output = Result<()>> {
        let server = Arc::clone(self);
        async move {
            let (tx, rx) = tokio::sync::oneshot::channel();
            tokio::spawn(async move {
                if let Err(e) = network::serve(server, listener, implicit_tls).await {
                    let _ = tx.send(e);
                }
            });
            match tokio::time::timeout(Duration::from_secs(1), rx).await {
                Ok(Ok(e)) => Err(e),
                _ => {
                    info!("Server started");
                    Ok(())
                }
            }
        }
    }
}
