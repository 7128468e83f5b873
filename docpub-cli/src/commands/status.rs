//! `docpub status`: pending work per tracked document.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use docpub_core::DocumentState;
use docpub_sync::{pipeline, StatusEntry, StatusSummary};

use crate::ConfigArg;

/// Arguments for `docpub status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let config_path = self.config.path()?;
        let entries = pipeline::status(&config_path).with_context(|| {
            format!(
                "failed to check '{}' (run `docpub init` to create a config)",
                config_path.display()
            )
        })?;
        let summary = StatusSummary::from_entries(&entries);

        if self.json {
            print_json(summary, entries)?;
            return Ok(());
        }
        print_table(summary, entries);
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusReportJson {
    summary: StatusSummary,
    documents: Vec<StatusEntry>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "document")]
    document: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_json(summary: StatusSummary, documents: Vec<StatusEntry>) -> Result<()> {
    let payload = StatusReportJson { summary, documents };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(summary: StatusSummary, entries: Vec<StatusEntry>) {
    println!(
        "docpub v{} | {} documents | {} pending | {} errors",
        env!("CARGO_PKG_VERSION"),
        entries.len(),
        summary.pending(),
        summary.errors,
    );
    if entries.is_empty() {
        println!("No documents tracked or discovered.");
        return;
    }

    let rows: Vec<StatusTableRow> = entries
        .into_iter()
        .map(|entry| StatusTableRow {
            state: state_label(entry.state),
            detail: entry.error.or(entry.remote_uri).unwrap_or_default(),
            document: entry.source_path,
            title: entry.title,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if summary.pending() > 0 {
        println!("Run 'docpub sync' to publish pending changes.");
    }
}

fn state_label(state: Option<DocumentState>) -> String {
    match state {
        Some(DocumentState::Create) => "CREATE".green().bold().to_string(),
        Some(DocumentState::Update) => "UPDATE".yellow().bold().to_string(),
        Some(DocumentState::Delete) => "DELETE".red().bold().to_string(),
        Some(DocumentState::Deleted) => "DELETED".bright_black().to_string(),
        Some(DocumentState::Current) => "CURRENT".to_string(),
        None => "ERROR".red().bold().to_string(),
    }
}
