// src/constants.rs

pub const DEFAULT_FTP_ADDR: &str = "0.0.0.0:2121";
pub const DEFAULT_PASV_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PASV_MIN_PORT: u16 = 30000;
pub const DEFAULT_PASV_MAX_PORT: u16 = 30100;
pub const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to My FTP Server";

/// Maximum accepted length of a single control-channel line.
pub const MAX_CONTROL_LINE: usize = 4096;

/// Timestamp format used by MDTM and the MLSD fact lines (UTC).
pub const MODIFY_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Upper bound on a single SFTP password authentication attempt.
pub const SFTP_AUTH_TIMEOUT_SECS: u64 = 5;
