use log::debug;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("password is incorrect")]
    BadPassword,
    #[error("ip origin {0} is not allowed")]
    IpNotAllowed(String),
    #[error("invalid network prefix: {0}")]
    BadPrefix(String),
}

/// A CIDR prefix, IPv4 or IPv6. A bare address parses as /32 or /128.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpNet {
    addr: IpAddr,
    prefix_len: u8,
}

impl IpNet {
    pub fn parse(s: &str) -> Result<Self, UserError> {
        let (addr_str, prefix_str) = match s.split_once('/') {
            Some((a, p)) => (a, Some(p)),
            None => (s, None),
        };
        let addr: IpAddr = addr_str
            .parse()
            .map_err(|_| UserError::BadPrefix(s.to_string()))?;
        let max = if addr.is_ipv4() { 32 } else { 128 };
        let prefix_len = match prefix_str {
            Some(p) => p
                .parse::<u8>()
                .ok()
                .filter(|len| *len <= max)
                .ok_or_else(|| UserError::BadPrefix(s.to_string()))?,
            None => max,
        };
        Ok(Self { addr, prefix_len })
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.addr, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = if self.prefix_len == 0 {
                    0
                } else {
                    u32::MAX << (32 - self.prefix_len)
                };
                u32::from(net) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = if self.prefix_len == 0 {
                    0
                } else {
                    u128::MAX << (128 - self.prefix_len)
                };
                u128::from(net) & mask == u128::from(ip) & mask
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub password: String,
    pub allowed_nets: Vec<IpNet>,
}

impl User {
    pub fn ip_allowed(&self, ip: IpAddr) -> bool {
        self.allowed_nets.iter().any(|net| net.contains(ip))
    }
}

/// Compares two strings without short-circuiting on the first mismatch.
fn passwords_match(supplied: &str, expected: &str) -> bool {
    if supplied.len() != expected.len() {
        return false;
    }
    supplied
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Registry of users allowed to authenticate. Lookups are hot, mutations
/// are rare; a single readers-writer lock covers both.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: RwLock<HashMap<String, User>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, username: &str) -> Result<User, UserError> {
        let users = self.users.read().unwrap();
        users.get(username).cloned().ok_or(UserError::NotFound)
    }

    /// Full authentication check: username, password and source address.
    pub fn find(&self, username: &str, password: &str, peer_ip: IpAddr) -> Result<User, UserError> {
        let user = self.get(username)?;
        if !passwords_match(password, &user.password) {
            return Err(UserError::BadPassword);
        }
        if !user.ip_allowed(peer_ip) {
            return Err(UserError::IpNotAllowed(peer_ip.to_string()));
        }
        Ok(user)
    }

    pub fn add(&self, username: &str, password: &str) -> User {
        let user = User {
            username: username.to_string(),
            password: password.to_string(),
            allowed_nets: Vec::new(),
        };
        let mut users = self.users.write().unwrap();
        users.insert(username.to_string(), user.clone());
        debug!("Registered user {}", username);
        user
    }

    pub fn remove(&self, username: &str) -> Option<User> {
        let mut users = self.users.write().unwrap();
        users.remove(username)
    }

    /// Adds a CIDR prefix to the user's allow-list.
    pub fn add_net(&self, username: &str, net: &str) -> Result<(), UserError> {
        let prefix = IpNet::parse(net)?;
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(username).ok_or(UserError::NotFound)?;
        if !user.allowed_nets.contains(&prefix) {
            user.allowed_nets.push(prefix);
        }
        Ok(())
    }

    pub fn remove_net(&self, username: &str, net: &str) -> Result<(), UserError> {
        let prefix = IpNet::parse(net)?;
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(username).ok_or(UserError::NotFound)?;
        user.allowed_nets.retain(|n| *n != prefix);
        Ok(())
    }

    pub fn list(&self) -> Vec<String> {
        let users = self.users.read().unwrap();
        users.keys().cloned().collect()
    }
}
