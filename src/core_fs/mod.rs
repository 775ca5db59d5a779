// Virtual filesystem layer shared by the FTP and SFTP front ends. Every
// path-bearing operation is confined to the configured root directory.

pub mod error;
pub mod local;
pub mod path;
pub mod statvfs;

pub use error::FsError;
pub use local::{LocalFs, TransferType};
pub use statvfs::StatVfs;
