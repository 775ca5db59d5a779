use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_FTP_ADDR, DEFAULT_PASV_ADDRESS, DEFAULT_PASV_MAX_PORT, DEFAULT_PASV_MIN_PORT,
    DEFAULT_WELCOME_MESSAGE,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub ftp_addr: String,
    pub root_dir: String,
    /// Public IPv4 address advertised in PASV replies.
    pub pasv_address: String,
    pub pasv_min_port: u16,
    pub pasv_max_port: u16,
    pub welcome_message: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ftp_addr: String::from(DEFAULT_FTP_ADDR),
            root_dir: String::from("/srv/ferrofsd"),
            pasv_address: String::from(DEFAULT_PASV_ADDRESS),
            pasv_min_port: DEFAULT_PASV_MIN_PORT,
            pasv_max_port: DEFAULT_PASV_MAX_PORT,
            welcome_message: String::from(DEFAULT_WELCOME_MESSAGE),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
    /// Accept `AUTH TLS` upgrades on the plain listener.
    #[serde(default = "default_explicit")]
    pub explicit: bool,
    /// Extra listener speaking implicit TLS (FTPS), e.g. "0.0.0.0:990".
    pub implicit_addr: Option<String>,
}

fn default_explicit() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SftpConfig {
    pub addr: String,
    /// OpenSSH-format host key. A fresh Ed25519 key is generated when absent.
    pub host_key_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserEntry {
    pub username: String,
    pub password: String,
    /// CIDR prefixes the user may authenticate from. Bare addresses are
    /// treated as /32 (IPv4) or /128 (IPv6).
    #[serde(default)]
    pub allowed_nets: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub tls: Option<TlsConfig>,
    pub sftp: Option<SftpConfig>,
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        Ok(config)
    }
}
