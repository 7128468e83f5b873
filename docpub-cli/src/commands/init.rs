//! `docpub init [dir] [--adapter <label>] [--base-url <url>]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use docpub_core::{config, RemoteConfig};
use docpub_remote::AdapterRegistry;

/// Create a docpub.yaml in a directory.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory that will hold the config and the documents.
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Remote adapter label (noop, cms).
    #[arg(long, short = 'a', default_value = "noop")]
    pub adapter: String,

    /// Base URL of the remote service's API.
    #[arg(long)]
    pub base_url: Option<String>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        AdapterRegistry::with_builtins()
            .check_label(&self.adapter)
            .context("cannot initialize")?;
        let dir = self
            .dir
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", self.dir.display()))?;

        let path = config::config_path_in(&dir);
        if path.exists() {
            println!("✓ Already initialized: {}", path.display());
            return Ok(());
        }

        let remote = RemoteConfig {
            adapter: self.adapter.clone(),
            base_url: self.base_url,
            ..RemoteConfig::default()
        };
        config::init_at(&path, remote)
            .with_context(|| format!("failed to write '{}'", path.display()))?;

        println!("✓ Created {} (adapter '{}')", path.display(), self.adapter);
        if self.adapter != "noop" {
            println!("  Add `token`, or `username` and `password`, under `remote` before syncing.");
        }
        Ok(())
    }
}
