//! CLI argument definitions using clap
//!
//! Commands:
//! - objindex serve --config <path> [--port <port>]
//! - objindex index --config <path>
//! - objindex remove --config <path> [--key <key>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// objindex - tombstone-guarded object index
#[derive(Parser, Debug)]
#[command(name = "objindex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP notification endpoints
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./objindex.json")]
        config: PathBuf,

        /// Override the configured HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Index one creation notification read from stdin
    Index {
        /// Path to configuration file
        #[arg(long, default_value = "./objindex.json")]
        config: PathBuf,
    },

    /// Remove one object; the key comes from --key or a JSON request on stdin
    Remove {
        /// Path to configuration file
        #[arg(long, default_value = "./objindex.json")]
        config: PathBuf,

        /// Object key to remove
        #[arg(long)]
        key: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
