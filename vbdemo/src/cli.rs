//! Command-line interface definition and parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Command-line arguments for the VoiceBid server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(short, long, env = "APP_CONFIG")]
    pub config: Option<PathBuf>,

    /// The HMAC secret for verification of JWT claims.
    #[arg(short, long, env = "APP_SECRET")]
    pub secret: String,

    /// Write the OpenAPI schema to this path and exit.
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Optional subcommand; with none, the server runs.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Auxiliary operations.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mint a bearer token for a bidder and print it.
    Token {
        /// The bidder id; a fresh one is generated when omitted.
        #[arg(long)]
        bidder: Option<Uuid>,

        /// Token validity, in days.
        #[arg(long, default_value_t = 30)]
        days: u64,
    },
}

impl Cli {
    /// Parse command-line arguments.
    pub fn import() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}
