use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use russh::keys::ssh_key::rand_core::OsRng;
use russh::server::{Auth, Msg, Server as _, Session};
use russh::{Channel, ChannelId};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::constants::SFTP_AUTH_TIMEOUT_SECS;
use crate::core_fs::LocalFs;
use crate::core_sftp::handler::SftpHandler;
use crate::users::UserRegistry;

/// SFTP server over SSH. Password authentication only; the host key is
/// loaded from a file or generated fresh at startup.
pub struct SftpServer {
    fs: Arc<LocalFs>,
    users: Arc<UserRegistry>,
    host_key: Option<russh::keys::PrivateKey>,
}

impl SftpServer {
    pub fn new(fs: Arc<LocalFs>, users: Arc<UserRegistry>) -> Self {
        Self {
            fs,
            users,
            host_key: None,
        }
    }

    pub fn set_host_key(&mut self, key: russh::keys::PrivateKey) {
        self.host_key = Some(key);
    }

    pub fn set_host_key_file(&mut self, path: &Path) -> Result<()> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("error reading host key file: {}", path.display()))?;
        let key = russh::keys::decode_secret_key(&data, None)
            .with_context(|| format!("error parsing host key file: {}", path.display()))?;
        self.host_key = Some(key);
        Ok(())
    }

    pub async fn serve(self, addr: &str) -> Result<()> {
        let key = match self.host_key {
            Some(key) => key,
            None => {
                info!("No SSH host key configured, generating an Ed25519 key");
                russh::keys::PrivateKey::random(&mut OsRng, russh::keys::Algorithm::Ed25519)
                    .context("error generating SSH host key")?
            }
        };

        let config = russh::server::Config {
            auth_rejection_time: Duration::from_secs(3),
            auth_rejection_time_initial: Some(Duration::from_secs(0)),
            methods: russh::MethodSet::PASSWORD,
            keys: vec![key],
            ..Default::default()
        };

        let mut listener = SshListener {
            fs: self.fs,
            users: self.users,
        };

        info!("SFTP server listening on {}", addr);
        listener
            .run_on_address(Arc::new(config), addr)
            .await
            .context("error running SFTP server")?;
        Ok(())
    }
}

#[derive(Clone)]
struct SshListener {
    fs: Arc<LocalFs>,
    users: Arc<UserRegistry>,
}

impl russh::server::Server for SshListener {
    type Handler = SshConnection;

    fn new_client(&mut self, addr: Option<SocketAddr>) -> Self::Handler {
        info!("New SSH connection from {:?}", addr);
        SshConnection {
            fs: Arc::clone(&self.fs),
            users: Arc::clone(&self.users),
            peer: addr,
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// One SSH connection; only `session` channels and the `sftp` subsystem are
/// accepted.
pub struct SshConnection {
    fs: Arc<LocalFs>,
    users: Arc<UserRegistry>,
    peer: Option<SocketAddr>,
    channels: Arc<Mutex<HashMap<ChannelId, Channel<Msg>>>>,
}

#[async_trait]
impl russh::server::Handler for SshConnection {
    type Error = russh::Error;

    async fn auth_password(&mut self, user: &str, password: &str) -> Result<Auth, Self::Error> {
        let peer_ip = self
            .peer
            .map(|addr| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let users = Arc::clone(&self.users);
        let username = user.to_string();
        let supplied = password.to_string();
        let verdict = tokio::time::timeout(
            Duration::from_secs(SFTP_AUTH_TIMEOUT_SECS),
            tokio::task::spawn_blocking(move || users.find(&username, &supplied, peer_ip)),
        )
        .await;

        match verdict {
            Ok(Ok(Ok(_user))) => {
                info!("SFTP user {} authenticated from {}", user, peer_ip);
                Ok(Auth::Accept)
            }
            Ok(Ok(Err(e))) => {
                warn!("password rejected for {:?}: {}", user, e);
                Ok(Auth::Reject {
                    proceed_with_methods: None,
                })
            }
            _ => {
                warn!("authentication timed out for {:?}", user);
                Ok(Auth::Reject {
                    proceed_with_methods: None,
                })
            }
        }
    }

    async fn auth_publickey(
        &mut self,
        user: &str,
        _public_key: &russh::keys::PublicKey,
    ) -> Result<Auth, Self::Error> {
        debug!("Public key authentication rejected for {:?}", user);
        Ok(Auth::Reject {
            proceed_with_methods: None,
        })
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        debug!("Opening session channel {:?}", channel.id());
        self.channels.lock().await.insert(channel.id(), channel);
        Ok(true)
    }

    async fn subsystem_request(
        &mut self,
        channel_id: ChannelId,
        name: &str,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        debug!("Subsystem request {:?} on {:?}", name, channel_id);

        if name == "sftp" {
            if let Some(channel) = self.channels.lock().await.remove(&channel_id) {
                let handler = SftpHandler::new(Arc::clone(&self.fs));
                session.channel_success(channel_id)?;
                russh_sftp::server::run(channel.into_stream(), handler).await;
            }
        } else {
            session.channel_failure(channel_id)?;
        }

        Ok(())
    }

    async fn channel_eof(
        &mut self,
        channel_id: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        debug!("Channel EOF on {:?}", channel_id);
        session.close(channel_id)?;
        Ok(())
    }
}
