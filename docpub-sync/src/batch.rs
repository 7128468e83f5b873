//! Batch processor with per-item failure isolation.
//!
//! [`execute`] runs a task once per collected item, in order, on the calling
//! thread. A failing item is recorded and the batch moves on; nothing already
//! done for earlier items is undone. After the last item, the `after_batch`
//! hook sees every failure and decides whether they were handled. Unhandled
//! failures come back as one [`BatchError`].

use std::fmt;

use docpub_core::{DocumentKey, DocumentMetadata};

/// Items that can name themselves in error reports.
pub trait Identify {
    fn identity(&self) -> Option<String> {
        None
    }
}

impl Identify for DocumentKey {
    fn identity(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl Identify for DocumentMetadata {
    fn identity(&self) -> Option<String> {
        Some(self.key().to_string())
    }
}

impl Identify for String {
    fn identity(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl Identify for &str {
    fn identity(&self) -> Option<String> {
        Some((*self).to_string())
    }
}

/// One failed item, tagged with the item's identity when it has one.
#[derive(Debug)]
pub struct ItemError<E> {
    pub item: Option<String>,
    pub error: E,
}

impl<E: fmt::Display> fmt::Display for ItemError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.item {
            Some(item) => write!(f, "{item}: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ItemError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Every unhandled failure of one batch.
#[derive(Debug)]
pub struct BatchError<E> {
    pub errors: Vec<ItemError<E>>,
}

impl<E> BatchError<E> {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A plain error raised outside any item (e.g. while collecting).
impl<E> From<E> for BatchError<E> {
    fn from(error: E) -> Self {
        BatchError {
            errors: vec![ItemError { item: None, error }],
        }
    }
}

impl<E: fmt::Display> fmt::Display for BatchError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} item(s) failed", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for BatchError<E> {}

/// Counts for a batch that completed without unhandled failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub attempted: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed
    }
}

/// Run `task` for every item produced by `collect`.
///
/// - A `collect` failure becomes the batch's error list and no task runs.
/// - A task failure is recorded with the item's identity; the next item still
///   runs.
/// - `after_batch` is called once with every recorded failure. If it returns
///   `false` and there were failures, they are returned as a [`BatchError`].
pub fn execute<T, E, C, F, A>(
    collect: C,
    mut task: F,
    after_batch: A,
) -> Result<BatchSummary, BatchError<E>>
where
    T: Identify,
    C: FnOnce() -> Result<Vec<T>, BatchError<E>>,
    F: FnMut(T) -> Result<(), E>,
    A: FnOnce(&[ItemError<E>]) -> bool,
{
    let (attempted, errors) = match collect() {
        Ok(items) => {
            let attempted = items.len();
            let mut errors = Vec::new();
            for item in items {
                let identity = item.identity();
                if let Err(error) = task(item) {
                    if let Some(id) = &identity {
                        tracing::debug!(item = %id, "batch item failed");
                    }
                    errors.push(ItemError {
                        item: identity,
                        error,
                    });
                }
            }
            (attempted, errors)
        }
        Err(batch) => (0, batch.errors),
    };

    let handled = after_batch(&errors);
    if errors.is_empty() || handled {
        Ok(BatchSummary {
            attempted,
            failed: errors.len(),
        })
    } else {
        Err(BatchError { errors })
    }
}

/// [`execute`] with an `after_batch` that never handles failures.
pub fn execute_all<T, E, C, F>(collect: C, task: F) -> Result<BatchSummary, BatchError<E>>
where
    T: Identify,
    C: FnOnce() -> Result<Vec<T>, BatchError<E>>,
    F: FnMut(T) -> Result<(), E>,
{
    execute(collect, task, |_| false)
}
