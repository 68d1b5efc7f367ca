//! CLI for the logres resource updater.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use logres_core::config;
use std::path::Path;

use commands::{run_checksum, run_install, run_list, run_status};

/// Top-level CLI for the logres resource updater.
#[derive(Debug, Parser)]
#[command(name = "logres")]
#[command(about = "logres: resolve, download, and install Logos resource updates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show the located installation and its pending updates.
    Status {
        /// Directory to search for the installation (e.g. a Wine prefix).
        start_dir: String,
    },

    /// Resolve updates and print the selected download URLs to stdout.
    List {
        /// Directory to search for the installation (e.g. a Wine prefix).
        start_dir: String,
        /// Selection expression such as "all" or "1,3"; prompts when omitted.
        #[arg(long, value_name = "EXPR")]
        select: Option<String>,
    },

    /// Download, verify, and install the selected updates.
    Install {
        /// Directory to search for the installation (e.g. a Wine prefix).
        start_dir: String,
        /// Selection expression such as "all" or "1,3"; prompts when omitted.
        #[arg(long, value_name = "EXPR")]
        select: Option<String>,
    },

    /// Compute the MD5 of a file, in hex and in the base64 form used for
    /// payload verification.
    Checksum {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Status { start_dir } => run_status(Path::new(&start_dir)).await?,
            CliCommand::List { start_dir, select } => {
                run_list(Path::new(&start_dir), select.as_deref()).await?;
            }
            CliCommand::Install { start_dir, select } => {
                let interrupted =
                    run_install(Path::new(&start_dir), select.as_deref(), &cfg).await?;
                if interrupted {
                    // Conventional exit status for SIGINT; per-record staging
                    // has already been unwound by this point.
                    std::process::exit(130);
                }
            }
            CliCommand::Checksum { path } => run_checksum(Path::new(&path)).await?,
        }

        Ok(())
    }
}
