//! Hostprint command-line tool
//!
//! Fingerprints the local machine through the built-in system host:
//! catalog types are instantiated and explored, the shell command table is
//! run, and the merged report is written as a JSON array.

mod commands;
mod logging;
mod settings;
mod system;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::scan::ScanOptions;

#[derive(Parser)]
#[command(name = "hostprint")]
#[command(about = "Reflective host fingerprinting", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a fingerprinting pass and print the report
    Scan {
        /// JSON array of type names to scan (default: every system type)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
        /// Skip the shell command table
        #[arg(long)]
        no_commands: bool,
    },

    /// List the built-in system host types
    Types,

    /// Print the effective configuration as TOML
    Config {
        /// Configuration file to validate and print
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            catalog,
            config,
            output,
            pretty,
            no_commands,
        } => commands::scan::execute(&ScanOptions {
            catalog,
            config,
            output,
            pretty,
            no_commands,
        }),

        Commands::Types => commands::types::execute(),

        Commands::Config { config } => commands::config::execute(config.as_deref()),
    }
}
