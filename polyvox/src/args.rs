use std::path::PathBuf;

use clap::Parser;

/// Polyvox speech and caption service
#[derive(Debug, Parser)]
#[command(name = "polyvox", about = "Text-to-speech with tiered fallback and translated subtitles")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "polyvox.toml", env = "POLYVOX_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "POLYVOX_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,

    /// Validate the configuration and exit
    #[arg(long)]
    pub check: bool,
}
