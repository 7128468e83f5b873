//! docpub: publish local markdown documents to a remote content repository.
//!
//! # Usage
//!
//! ```text
//! docpub init [dir] [--adapter noop|cms] [--base-url URL]
//! docpub sync [--config FILE] [--dry-run] [--retry-failed] [--ignore-failures] [--templates DIR]
//! docpub status [--config FILE] [--json]
//! docpub delete <sourcePath> [--config FILE]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{delete::DeleteArgs, init::InitArgs, status::StatusArgs, sync::SyncArgs};
use docpub_core::config::CONFIG_FILE_NAME;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "docpub",
    version,
    about = "Publish and synchronize markdown documents with a remote content service",
    long_about = None,
)]
struct Cli {
    /// Log more detail (`-v` debug, `-vv` trace). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a docpub.yaml in a directory.
    Init(InitArgs),

    /// Publish new and changed documents and apply pending deletions.
    Sync(SyncArgs),

    /// Show what the next sync would do, without contacting the remote.
    Status(StatusArgs),

    /// Mark a tracked document for deletion on the next sync.
    Delete(DeleteArgs),
}

// ---------------------------------------------------------------------------
// Shared --config argument
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Clone)]
pub struct ConfigArg {
    /// Path to the config file.
    #[arg(long, short = 'c', value_name = "FILE", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,
}

impl ConfigArg {
    /// Absolute config path, so relative source paths resolve against the
    /// config file's directory rather than `.`.
    pub fn path(&self) -> Result<PathBuf> {
        if self.config.is_absolute() {
            return Ok(self.config.clone());
        }
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        Ok(cwd.join(&self.config))
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(command = ?cli.command, "starting");
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Delete(args) => args.run(),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
