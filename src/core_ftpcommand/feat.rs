use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core_network::stream::FtpStream;
use crate::helpers::send_response;
use crate::server::FtpServer;

/// Handles the FEAT command: list the supported extensions. The TLS entries
/// appear only when an explicit-TLS configuration is loaded.
pub async fn handle_feat_command(
    writer: Arc<Mutex<FtpStream>>,
    server: Arc<FtpServer>,
) -> Result<(), std::io::Error> {
    let mut features = vec![
        "211-Features:",
        " UTF8",
        " MLST type*;size*;modify*;",
        " MLSD",
        " SIZE",
        " MDTM",
        " REST STREAM",
        " EPSV",
    ];
    if server.explicit_tls {
        features.extend([" AUTH TLS", " AUTH SSL", " PBSZ", " PROT"]);
    }
    features.push("211 End");

    let response = features.join("\r\n") + "\r\n";
    send_response(&writer, response.as_bytes()).await
}
