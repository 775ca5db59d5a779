use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::core_fs::TransferType;
use crate::users::User;

/// Data-channel protection level set by PROT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataProtection {
    Clear,
    Private,
}

/// State of the FTP data channel negotiation. Exactly one transfer runs per
/// negotiated channel; the channel is reset to `Idle` on every exit path.
#[derive(Debug)]
pub enum DataChannel {
    Idle,
    /// PASV/EPSV: we listen, the client dials.
    Passive(TcpListener),
    /// PORT/EPRT: the client listens, we dial at transfer time.
    Active(SocketAddr),
}

/// Per-connection mutable state. Owned by the session task; never touched
/// by another session.
#[derive(Debug)]
pub struct Session {
    pub authenticated: bool,
    pub pending_username: Option<String>,
    pub user: Option<User>,
    /// Client-facing working directory, rooted at `/`.
    pub cwd: String,
    pub transfer_type: TransferType,
    pub data_channel: DataChannel,
    pub data_protection: DataProtection,
    /// Virtual path recorded by RNFR, consumed by the next RNTO.
    pub rename_from: Option<String>,
    pub peer_addr: SocketAddr,
}

impl Session {
    pub fn new(peer_addr: SocketAddr) -> Self {
        Self {
            authenticated: false,
            pending_username: None,
            user: None,
            cwd: String::from("/"),
            transfer_type: TransferType::Ascii,
            data_channel: DataChannel::Idle,
            data_protection: DataProtection::Clear,
            rename_from: None,
            peer_addr,
        }
    }

    pub fn take_data_channel(&mut self) -> DataChannel {
        std::mem::replace(&mut self.data_channel, DataChannel::Idle)
    }
}

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Builds an opaque per-connection id from the remote address and a
/// monotonic counter.
pub fn session_id(peer_addr: SocketAddr) -> String {
    let seq = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}#{}", peer_addr, seq)
}

/// Process-wide registry of live sessions keyed by connection id. Purely an
/// observation surface; no cross-session coordination happens here.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, id: String, session: Arc<Mutex<Session>>) {
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(id, session);
    }

    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        let sessions = self.sessions.read().unwrap();
        sessions.get(id).cloned()
    }

    /// Removal is idempotent; a second remove for the same id is a no-op.
    pub fn remove(&self, id: &str) {
        let mut sessions = self.sessions.write().unwrap();
        sessions.remove(id);
    }

    pub fn len(&self) -> usize {
        let sessions = self.sessions.read().unwrap();
        sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn new_session_defaults() {
        let session = Session::new(addr());
        assert!(!session.authenticated);
        assert_eq!(session.cwd, "/");
        assert_eq!(session.transfer_type, TransferType::Ascii);
        assert_eq!(session.data_protection, DataProtection::Clear);
        assert!(matches!(session.data_channel, DataChannel::Idle));
    }

    #[test]
    fn session_ids_are_unique_per_connection() {
        assert_ne!(session_id(addr()), session_id(addr()));
    }

    #[test]
    fn manager_add_remove_is_idempotent() {
        let manager = SessionManager::new();
        let id = session_id(addr());
        manager.add(id.clone(), Arc::new(Mutex::new(Session::new(addr()))));
        assert_eq!(manager.len(), 1);
        manager.remove(&id);
        manager.remove(&id);
        assert!(manager.is_empty());
    }
}
