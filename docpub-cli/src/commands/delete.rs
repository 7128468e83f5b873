//! `docpub delete <sourcePath>`: set the delete marker on a tracked document.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use docpub_sync::pipeline;

use crate::ConfigArg;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Source path of the document, relative to the config file.
    pub source_path: PathBuf,

    #[command(flatten)]
    pub config: ConfigArg,
}

impl DeleteArgs {
    pub fn run(self) -> Result<()> {
        let config_path = self.config.path()?;
        let marked = pipeline::mark_for_deletion(&config_path, &self.source_path)
            .with_context(|| format!("failed to update '{}'", config_path.display()))?;
        if !marked {
            bail!("no tracked document at '{}'", self.source_path.display());
        }
        println!(
            "✓ '{}' will be deleted from the remote on the next sync",
            self.source_path.display()
        );
        Ok(())
    }
}
