//! # docpub-sync
//!
//! The synchronization engine: batch processing with per-document failure
//! isolation, the orchestrator that drives each document through state
//! resolution, conversion and remote dispatch, and the pipeline entrypoints
//! the CLI calls.
//!
//! Call [`pipeline::run`] for a full sync or [`pipeline::status`] for an
//! offline preview.

pub mod batch;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod status;

pub use batch::{execute, BatchError, BatchSummary, Identify, ItemError};
pub use context::SyncContext;
pub use error::SyncError;
pub use orchestrator::{Orchestrator, Outcome, SyncOptions, SyncReport};
pub use pipeline::RunOptions;
pub use status::{StatusEntry, StatusSummary};
