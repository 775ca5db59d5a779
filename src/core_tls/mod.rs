// SSL/TLS support: implicit FTPS listeners, the explicit AUTH TLS upgrade
// and the PROT P data-channel wrapping all share one acceptor/connector pair.

pub mod error;
pub mod tls_connection;

pub use error::TlsError;
pub use tls_connection::TlsConnection;
