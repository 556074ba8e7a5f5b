//! CLI module for authgate
//!
//! Provides command-line interface parsing for the authgate-server binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// authgate - stateless account authentication service
///
/// Registers accounts, checks passwords, and issues and verifies
/// HS256 bearer tokens.
#[derive(Parser, Debug)]
#[command(
    name = "authgate-server",
    version,
    about = "authgate - stateless account authentication service",
    after_help = "EXAMPLES:\n    \
                  authgate-server                        # Start the server (reads authgate.toml if present)\n    \
                  authgate-server --config prod.toml     # Use a custom config file\n    \
                  authgate-server check-config           # Validate configuration and exit"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "authgate.toml", global = true, env = "AUTHGATE_CONFIG")]
    pub config: PathBuf,

    /// Enable debug logging regardless of the configured level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Load and validate the configuration, print a summary, and exit
    ///
    /// Secrets are resolved but never printed.
    CheckConfig,
}

impl Cli {
    /// The command to run, `serve` when none was given.
    pub fn resolved_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
