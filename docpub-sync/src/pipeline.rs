//! Shared sync pipeline entrypoint used by the CLI.
//!
//! Load config → build the remote (fail fast) → seed newly discovered
//! documents → run the orchestrator → save the config.

use std::path::{Path, PathBuf};

use docpub_core::{config, Config, DocumentMetadata};
use docpub_discovery::{derive_title, discover};
use docpub_remote::AdapterRegistry;
use docpub_renderer::HtmlConverter;

use crate::context::SyncContext;
use crate::error::SyncError;
use crate::orchestrator::{Orchestrator, SyncOptions, SyncReport};
use crate::status::{self, StatusEntry};

/// Settings for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub sync: SyncOptions,
    /// Directory of `.tera` templates overriding the embedded page template.
    pub template_dir: Option<PathBuf>,
}

/// Run a full sync for the config at `config_path`.
///
/// Configuration problems (unreadable file, unknown adapter, missing
/// credentials) abort before any document is touched. Per-document failures
/// are reported in the returned [`SyncReport`]; the config is saved either way
/// unless this is a dry run.
pub fn run(
    config_path: &Path,
    registry: &AdapterRegistry,
    options: &RunOptions,
) -> Result<SyncReport, SyncError> {
    let mut config = config::load_at(config_path)?;
    let remote = registry.build(&config.remote)?;
    let base = config::base_dir(config_path);
    let mut ctx = SyncContext::new(&base, &config);

    let seeded = seed(&mut config, &ctx)?;
    if seeded > 0 {
        tracing::info!(count = seeded, "tracking newly discovered documents");
    }

    let converter = HtmlConverter::new(&base, &ctx.output, options.template_dir.as_deref())?;
    let orchestrator = Orchestrator::new(remote.as_ref(), &converter, options.sync);
    let report = orchestrator.sync(&mut config, &mut ctx);

    if !options.sync.dry_run {
        config::save_at(config_path, &config)?;
    }
    tracing::info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failures.len(),
        "sync finished"
    );
    Ok(report)
}

/// Resolve every tracked document's state without contacting the remote.
///
/// Documents that discovery would add are included as `create`.
pub fn status(config_path: &Path) -> Result<Vec<StatusEntry>, SyncError> {
    let mut config = config::load_at(config_path)?;
    let base = config::base_dir(config_path);
    let ctx = SyncContext::new(&base, &config);
    seed(&mut config, &ctx)?;
    Ok(status::check(&config, &ctx))
}

/// Append a record for every discovered file not yet tracked by source path.
/// Returns how many were added.
pub fn seed(config: &mut Config, ctx: &SyncContext) -> Result<usize, SyncError> {
    let found = discover(&ctx.base_dir, &ctx.roots, &ctx.include, &ctx.exclude)?;
    let mut added = 0;
    for source_path in found {
        if config.find_by_path(&source_path).is_some() {
            continue;
        }
        let title = derive_title(&ctx.base_dir.join(&source_path))?;
        tracing::debug!(path = %source_path.display(), title = %title, "discovered");
        config.metadata.push(DocumentMetadata::new(source_path, title));
        added += 1;
    }
    Ok(added)
}

/// Set the delete marker on the document tracked at `source_path`.
///
/// Returns `false` when no document is tracked at that path.
pub fn mark_for_deletion(config_path: &Path, source_path: &Path) -> Result<bool, SyncError> {
    let mut config = config::load_at(config_path)?;
    let Some(document) = config.find_by_path_mut(source_path) else {
        return Ok(false);
    };
    document.set_extra_prop(docpub_core::props::DELETE, "true");
    config::save_at(config_path, &config)?;
    Ok(true)
}
