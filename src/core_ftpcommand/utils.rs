use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_fs::path::join_virtual;
use crate::session::Session;

/// Resolves a command argument against the session working directory into
/// the virtual path handed to the filesystem layer.
pub async fn resolve_arg(session: &Arc<Mutex<Session>>, arg: &str) -> String {
    let cwd = session.lock().await.cwd.clone();
    join_virtual(&cwd, arg.trim())
}
