use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vodpack::encode::ladder::Codec;

#[derive(Parser)]
#[command(name = "vodpack")]
#[command(author, version, about = "Encrypted adaptive-bitrate HLS packaging tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the storage directory for packages and the catalog
    #[arg(short = 'p', long, global = true)]
    pub output_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a source video into an encrypted streaming package
    Encode {
        /// Path to the source video
        #[arg(required = true)]
        input: PathBuf,

        /// Codec to encode with: h264 or h265
        #[arg(short = 'C', long, default_value = "h264")]
        codec: Codec,

        /// When the source is already encoded, replace the existing package
        #[arg(short, long)]
        overwrite: bool,
    },

    /// List catalogued packages
    List,

    /// Print the playable locator for an existing package
    Uri {
        /// Package id or path to the source video
        #[arg(required = true)]
        id_or_path: String,
    },

    /// Check that required external tools are available
    CheckTools,
}
