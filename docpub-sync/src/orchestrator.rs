//! Synchronization orchestrator: one batch item per tracked document.
//!
//! For each document, in config order: resolve its state, make sure a
//! converted artifact exists when the remote cannot render markdown, dispatch
//! the matching remote call, then fold the result back into the record.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;

use docpub_core::checksum::{checksum_bytes, checksum_file};
use docpub_core::{state, Config, DocumentKey, DocumentMetadata, DocumentState, RemoteUpdate};
use docpub_remote::{BodyFormat, DocumentBody, Publication, Remote};
use docpub_renderer::Converter;

use crate::batch::{self, Identify, ItemError};
use crate::context::SyncContext;
use crate::error::{io_err, SyncError};

/// Run-wide switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Resolve and report states only: no conversion, no remote calls, no
    /// record changes.
    pub dry_run: bool,
    /// Leave `sourceChecksum` untouched when the remote call fails so the
    /// next run retries the document even if its content is unchanged.
    pub retry_failed: bool,
}

/// What happened to one document that processed without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub source_path: PathBuf,
    pub title: String,
    pub state: DocumentState,
    /// `true` when a remote call was made.
    pub applied: bool,
    pub warnings: Vec<String>,
}

impl Outcome {
    fn new(document: &DocumentMetadata, state: DocumentState) -> Self {
        Self {
            source_path: document.source_path.clone(),
            title: document.title.clone(),
            state,
            applied: false,
            warnings: Vec::new(),
        }
    }
}

/// Result of one sync batch.
#[derive(Debug)]
pub struct SyncReport {
    pub total: usize,
    pub succeeded: usize,
    pub outcomes: Vec<Outcome>,
    pub failures: Vec<ItemError<SyncError>>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn warnings(&self) -> impl Iterator<Item = (&Outcome, &str)> {
        self.outcomes
            .iter()
            .flat_map(|o| o.warnings.iter().map(move |w| (o, w.as_str())))
    }
}

/// One batch item: a record's position plus its identity at collection time.
struct Tracked {
    index: usize,
    key: DocumentKey,
    /// An earlier record already has this identity.
    duplicate: bool,
}

impl Identify for Tracked {
    fn identity(&self) -> Option<String> {
        self.key.identity()
    }
}

pub struct Orchestrator<'a> {
    remote: &'a dyn Remote,
    converter: &'a dyn Converter,
    options: SyncOptions,
}

impl<'a> Orchestrator<'a> {
    pub fn new(remote: &'a dyn Remote, converter: &'a dyn Converter, options: SyncOptions) -> Self {
        Self {
            remote,
            converter,
            options,
        }
    }

    /// Process every tracked document. Failures are isolated per document and
    /// collected in the report.
    pub fn sync(&self, config: &mut Config, ctx: &mut SyncContext) -> SyncReport {
        let mut seen = HashSet::new();
        let items: Vec<Tracked> = config
            .metadata
            .iter()
            .enumerate()
            .map(|(index, doc)| {
                let key = doc.key();
                Tracked {
                    index,
                    duplicate: !seen.insert(key.clone()),
                    key,
                }
            })
            .collect();
        let total = items.len();
        let mut outcomes = Vec::with_capacity(total);

        let result = batch::execute(
            move || Ok(items),
            |item: Tracked| {
                let outcome = self.process(&item, config, ctx)?;
                outcomes.push(outcome);
                Ok(())
            },
            |failures: &[ItemError<SyncError>]| {
                for failure in failures {
                    tracing::warn!("{failure}");
                }
                false
            },
        );
        let failures = match result {
            Ok(_) => Vec::new(),
            Err(batch) => batch.errors,
        };

        SyncReport {
            total,
            succeeded: total - failures.len(),
            outcomes,
            failures,
        }
    }

    fn process(
        &self,
        item: &Tracked,
        config: &mut Config,
        ctx: &mut SyncContext,
    ) -> Result<Outcome, SyncError> {
        let key = &item.key;
        if item.duplicate {
            return Err(SyncError::Duplicate(key.to_string()));
        }
        let index = item.index;
        let snapshot = match config.metadata.get(index) {
            Some(doc) if doc.key() == *key => doc.clone(),
            _ => return Err(SyncError::Untracked(key.to_string())),
        };
        let source = ctx.source_path(&snapshot);
        let current = checksum_file(&source).map_err(|e| io_err(&source, e))?;
        let state = state::resolve(&snapshot, current)?;
        let mut outcome = Outcome::new(&snapshot, state);

        if self.options.dry_run {
            tracing::info!(document = %key, %state, "[dry-run] resolved");
            return Ok(outcome);
        }
        if !state.needs_remote() {
            tracing::debug!(document = %key, %state, "no remote call needed");
            if let Some(checksum) = current {
                config.metadata[index].source_checksum = Some(checksum);
            }
            return Ok(outcome);
        }

        let dispatched = self.dispatch(state, &snapshot, config, ctx);
        let document = &mut config.metadata[index];
        match dispatched {
            Ok((update, converted)) => {
                if current.is_some() {
                    document.source_checksum = current;
                }
                if converted.is_some() {
                    document.converted_checksum = converted;
                }
                document.merge(&update);
                if state == DocumentState::Delete {
                    document.deleted_on = Some(Utc::now());
                }
                tracing::info!(document = %key, %state, "synchronized");
                outcome.applied = true;
                outcome.warnings = update.warnings;
                Ok(outcome)
            }
            Err(err) => {
                if !self.options.retry_failed && current.is_some() {
                    document.source_checksum = current;
                }
                Err(err)
            }
        }
    }

    fn dispatch(
        &self,
        state: DocumentState,
        document: &DocumentMetadata,
        config: &Config,
        ctx: &mut SyncContext,
    ) -> Result<(RemoteUpdate, Option<u64>), SyncError> {
        match state {
            DocumentState::Create | DocumentState::Update => {
                let (body, converted) = self.body_for(document, ctx)?;
                let publication = Publication {
                    document,
                    body,
                    tags: config.effective_tags(document),
                    extra_props: config.effective_extra_props(document),
                };
                let update = if state == DocumentState::Create {
                    self.remote.create(&publication)?
                } else {
                    self.remote.update(&publication)?
                };
                Ok((update, converted))
            }
            DocumentState::Delete => Ok((self.remote.delete(document)?, None)),
            DocumentState::Deleted | DocumentState::Current => Ok((RemoteUpdate::default(), None)),
        }
    }

    /// Body to publish plus the converted artifact's checksum, if converted.
    fn body_for(
        &self,
        document: &DocumentMetadata,
        ctx: &mut SyncContext,
    ) -> Result<(DocumentBody, Option<u64>), SyncError> {
        if self.remote.native_markdown() {
            let source = ctx.source_path(document);
            let text = fs::read_to_string(&source).map_err(|e| io_err(&source, e))?;
            let body = DocumentBody {
                format: BodyFormat::Markdown,
                text,
            };
            return Ok((body, None));
        }

        let artifact = ctx.converted(document, self.converter)?;
        let bytes = fs::read(&artifact).map_err(|e| io_err(&artifact, e))?;
        let checksum = checksum_bytes(&bytes);
        let body = DocumentBody {
            format: BodyFormat::Html,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        };
        Ok((body, Some(checksum)))
    }
}
