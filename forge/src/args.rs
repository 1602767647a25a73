use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Forge video content gateway
#[derive(Debug, Parser)]
#[command(
    name = "forge",
    about = "Image, speech, tag and title generation functions for video projects"
)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "forge.toml", env = "FORGE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "FORGE_LISTEN")]
    pub listen: Option<SocketAddr>,
}
