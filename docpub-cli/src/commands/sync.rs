//! `docpub sync`: publish new and changed documents, apply deletions.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use docpub_core::DocumentState;
use docpub_remote::AdapterRegistry;
use docpub_sync::{pipeline, Outcome, RunOptions, SyncOptions, SyncReport};

use crate::ConfigArg;

/// Arguments for `docpub sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Resolve and report what would happen without converting, calling the
    /// remote or saving the config.
    #[arg(long)]
    pub dry_run: bool,

    /// Keep a failed document's stored checksum so the next run retries it.
    #[arg(long)]
    pub retry_failed: bool,

    /// Exit successfully even when some documents failed.
    #[arg(long)]
    pub ignore_failures: bool,

    /// Directory of `.tera` templates overriding the built-in page template.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config_path = self.config.path()?;
        let options = RunOptions {
            sync: SyncOptions {
                dry_run: self.dry_run,
                retry_failed: self.retry_failed,
            },
            template_dir: self.templates.clone(),
        };

        let report = pipeline::run(&config_path, &AdapterRegistry::with_builtins(), &options)
            .with_context(|| {
                format!(
                    "sync failed for '{}' (run `docpub init` to create a config)",
                    config_path.display()
                )
            })?;
        print_report(&report, self.dry_run);

        if !report.is_success() && !self.ignore_failures {
            bail!("{} document(s) failed to synchronize", report.failures.len());
        }
        Ok(())
    }
}

fn print_report(report: &SyncReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let headline = format!(
        "{prefix}{} of {} documents processed successfully",
        report.succeeded, report.total
    );
    if report.is_success() {
        println!("{}", headline.green());
    } else {
        println!("{}", headline.yellow());
    }

    for outcome in &report.outcomes {
        println!("  {} {}", marker(outcome, dry_run), describe(outcome));
    }
    for (outcome, warning) in report.warnings() {
        println!(
            "  {} {}: {warning}",
            "!".yellow(),
            outcome.source_path.display()
        );
    }
    for failure in &report.failures {
        println!("  {} {failure}", "✗".red());
    }
}

fn marker(outcome: &Outcome, dry_run: bool) -> &'static str {
    if outcome.applied {
        "✎"
    } else if dry_run && outcome.state.needs_remote() {
        "~"
    } else {
        "·"
    }
}

fn describe(outcome: &Outcome) -> String {
    let label = format!("{:<8}", outcome.state.to_string());
    let state = match outcome.state {
        DocumentState::Create => label.green(),
        DocumentState::Update => label.yellow(),
        DocumentState::Delete => label.red(),
        DocumentState::Deleted => label.bright_black(),
        DocumentState::Current => label.normal(),
    };
    format!(
        "{state} {} ({})",
        outcome.source_path.display(),
        outcome.title
    )
}
