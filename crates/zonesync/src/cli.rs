//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

/// Point registrar-hosted A records at an address
#[derive(Parser, Debug)]
#[command(name = "zonesync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity
    #[arg(long, global = true, value_enum, env = "ZONESYNC_LOG", default_value = "info")]
    pub log: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or replace the A record for a subdomain
    Set {
        /// Fully-qualified name to update (e.g. dev.example.com)
        #[arg(short, long)]
        domain: String,

        /// IPv4 address for the record (defaults to DEFAULT_IP)
        #[arg(short, long)]
        ip: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Fetch and reconcile, but do not push
        #[arg(long)]
        dry_run: bool,
    },

    /// List the live records of a zone without changing anything
    Show {
        /// Domain or any name inside it (e.g. example.com)
        #[arg(short, long)]
        domain: String,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}
