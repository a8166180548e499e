//! Arbit CLI
//!
//! Offline tools for replication logs written by `arbit_core`.
//!
//! # Commands
//!
//! - `dump` - Print log records for debugging
//! - `verify` - Check that a log is well formed
//! - `version` - Show version information
//!
//! Logs are only ever opened for reading. Opening one through the
//! replication handle would truncate it.

mod commands;

use clap::{Parser, Subcommand};
use commands::Format;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Arbit replication log tools.
#[derive(Parser)]
#[command(name = "arbit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the replication log file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print log records
    Dump {
        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Skip records before this byte offset
        #[arg(short, long, default_value = "0")]
        offset: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Check that a log is well formed
    Verify {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Dump {
            limit,
            offset,
            format,
        } => {
            let path = cli.path.ok_or("Log path required for dump")?;
            commands::dump::run(&path, limit, offset, format)?;
        }
        Commands::Verify { format } => {
            let path = cli.path.ok_or("Log path required for verify")?;
            commands::verify::run(&path, format)?;
        }
        Commands::Version => {
            println!("Arbit CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Arbit Core v{}", arbit_core::VERSION);
        }
    }

    Ok(())
}
