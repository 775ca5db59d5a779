// SFTP front end: SSH transport with password authentication, `session`
// channels only, and the `sftp` subsystem dispatched onto the shared
// filesystem layer.

pub mod handler;
pub mod server;

pub use server::SftpServer;
