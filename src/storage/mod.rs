//! Storage for the question ID source and harvested results.
//!
//! - Source: a Parquet file with a `question_id` column, read once per run
//! - Results: an append-only Parquet dataset, one part file per flushed batch

mod columns;
pub mod dataset;
pub mod source;

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::Result;
use crate::models::{QuestionId, ScrapeResult};

// Re-export for convenience
pub use self::dataset::ParquetStore;
pub use self::source::load_question_ids;

/// Metadata about an append operation.
#[derive(Debug, Clone)]
pub struct AppendSummary {
    /// Number of rows appended
    pub rows: usize,
    /// Where the rows landed; `None` when nothing was written
    pub location: Option<PathBuf>,
}

/// Trait for result storage backends.
pub trait ResultStore: Send + Sync {
    /// Whether anything has been written yet.
    fn exists(&self) -> bool;

    /// IDs already present in the store.
    ///
    /// Fails with [`crate::error::AppError::StoreRead`] when the store exists
    /// but cannot be read.
    fn processed_ids(&self) -> Result<HashSet<QuestionId>>;

    /// Append a batch after all previously stored rows.
    ///
    /// Creates the store on first use. Fails with
    /// [`crate::error::AppError::StoreWrite`]; a failed append leaves earlier
    /// rows untouched.
    fn append(&self, results: &[ScrapeResult]) -> Result<AppendSummary>;
}
