use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("access denied: path is outside the root directory")]
    AccessDenied,

    #[error("permission denied")]
    PermissionDenied,

    #[error("no such file or directory")]
    NotFound,

    #[error("invalid time format got '{0}' expected 'YYYYMMDDHHMMSS'")]
    InvalidTimeFormat(String),

    #[error("invalid permissions")]
    InvalidMode,

    #[error("operation not supported on this platform")]
    Unsupported,

    #[error(transparent)]
    Io(std::io::Error),
}

impl From<std::io::Error> for FsError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound,
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied,
            _ => FsError::Io(e),
        }
    }
}
