use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ferrofsd", about = "A multi-protocol (FTP / FTPS / SFTP) file server.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Serve this directory, overriding the configuration file
    #[arg(short, long)]
    pub root_dir: Option<String>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
