//! Command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Incident tracker REST backend
#[derive(Debug, Parser)]
#[command(name = "incident-tracker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config.toml (defaults to ./config.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "-d", alias = "--daemon")]
    Serve,

    /// Apply database migrations and seed roles, then exit
    Migrate,

    /// Write a default config.toml if none exists
    Init,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}
