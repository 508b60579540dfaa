//! Target question ID source.

use std::collections::BTreeSet;
use std::path::Path;

use super::columns::question_ids;
use super::dataset::read_batches;
use crate::error::{AppError, Result};
use crate::models::QuestionId;

/// Load the full question ID universe from a Parquet file.
///
/// Any failure to open or decode the file is [`AppError::SourceUnavailable`].
/// Null and non-positive IDs are skipped with a warning.
pub fn load_question_ids(path: &Path) -> Result<BTreeSet<QuestionId>> {
    if !path.is_file() {
        return Err(AppError::source_unavailable(path, "file not found"));
    }

    let batches = read_batches(path).map_err(|e| AppError::source_unavailable(path, e))?;

    let mut ids = BTreeSet::new();
    let mut invalid = 0usize;
    for batch in &batches {
        let column = question_ids(batch).map_err(|e| AppError::source_unavailable(path, e))?;
        for value in column {
            match value.and_then(QuestionId::from_stored) {
                Some(id) => {
                    ids.insert(id);
                }
                None => invalid += 1,
            }
        }
    }

    if invalid > 0 {
        log::warn!(
            "Skipped {} null or non-positive question IDs in {}",
            invalid,
            path.display()
        );
    }

    Ok(ids)
}
