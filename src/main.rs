use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::{error, info};
use std::io::Write;
use std::sync::Arc;

use ferrofsd::config::Config;
use ferrofsd::core_cli::Cli;
use ferrofsd::core_fs::LocalFs;
use ferrofsd::core_sftp::SftpServer;
use ferrofsd::server::FtpServer;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let default_config_path = if cfg!(target_os = "windows") {
        "C:\\ProgramData\\ferrofsd\\ferrofsd.conf"
    } else {
        "/etc/ferrofsd.conf"
    };
    let config_path = if args.config.is_empty() {
        default_config_path
    } else {
        args.config.as_str()
    };

    let mut config = Config::load_from_file(config_path)?;
    if let Some(root_dir) = args.root_dir {
        config.server.root_dir = root_dir;
    }

    run(config).await
}

async fn run(config: Config) -> Result<()> {
    let server = FtpServer::new(&config)?;

    // Plain FTP listener, with AUTH TLS upgrades when configured.
    let ftp_listener = FtpServer::bind(&config.server.ftp_addr).await?;
    server.try_serve(ftp_listener, false).await?;
    info!("FTP server started on {}", config.server.ftp_addr);

    // Implicit-TLS listener (FTPS).
    if let Some(implicit_addr) = config.tls.as_ref().and_then(|t| t.implicit_addr.clone()) {
        let ftps_listener = FtpServer::bind(&implicit_addr).await?;
        server.try_serve(ftps_listener, true).await?;
        info!("FTPS server started on {}", implicit_addr);
    }

    // SFTP front end shares the root directory and the user registry.
    if let Some(sftp_config) = &config.sftp {
        let fs = Arc::new(LocalFs::new(&config.server.root_dir)?);
        let mut sftp_server = SftpServer::new(fs, Arc::clone(&server.users));
        if let Some(host_key_file) = &sftp_config.host_key_file {
            sftp_server.set_host_key_file(host_key_file)?;
        }
        let addr = sftp_config.addr.clone();
        tokio::spawn(async move {
            if let Err(e) = sftp_server.serve(&addr).await {
                error!("SFTP server failed: {}", e);
            }
        });
        info!("SFTP server started on {}", sftp_config.addr);
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
