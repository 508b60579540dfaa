//! Parquet dataset storage for scrape results.
//!
//! ## Storage Layout
//!
//! ```text
//! {output_dir}/bounty_timeline_results.parquet/
//! ├── part-00000.parquet     # first flushed batch
//! ├── part-00001.parquet
//! └── ...
//! ```
//!
//! Every append writes one new part under a hidden temporary name and renames
//! it into place. Existing parts are never rewritten, and a crash mid-write
//! leaves only a temporary file that readers ignore.

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::columns::{decode_results, encode_results, question_ids};
use crate::error::{AppError, Result};
use crate::models::{QuestionId, ScrapeResult};
use crate::storage::{AppendSummary, ResultStore};

const PART_PREFIX: &str = "part-";
const PART_SUFFIX: &str = ".parquet";

/// Append-only Parquet dataset on the local filesystem.
#[derive(Debug, Clone)]
pub struct ParquetStore {
    root: PathBuf,
}

impl ParquetStore {
    /// Create a store rooted at the given dataset directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Load every persisted row in append order.
    pub fn load_results(&self) -> Result<Vec<ScrapeResult>> {
        let mut results = Vec::new();
        for (_, path) in self.part_files()? {
            for batch in read_batches(&path)? {
                results.extend(decode_results(&batch)?);
            }
        }
        Ok(results)
    }

    /// Part files sorted by sequence number. Missing root means no parts.
    fn part_files(&self) -> Result<Vec<(u32, PathBuf)>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut parts = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(seq) = name.to_str().and_then(part_sequence) {
                parts.push((seq, entry.path()));
            }
        }
        parts.sort_by_key(|(seq, _)| *seq);
        Ok(parts)
    }

    fn write_part(&self, results: &[ScrapeResult]) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;

        let seq = self
            .part_files()?
            .last()
            .map_or(0, |(seq, _)| seq + 1);
        let name = format!("{PART_PREFIX}{seq:05}{PART_SUFFIX}");
        let path = self.root.join(&name);
        let tmp = self.root.join(format!(".{name}.tmp"));

        let batch = encode_results(results)?;
        let file = File::create(&tmp)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;

        fs::rename(&tmp, &path)?;
        Ok(path)
    }
}

impl ResultStore for ParquetStore {
    fn exists(&self) -> bool {
        self.root.exists()
    }

    fn processed_ids(&self) -> Result<HashSet<QuestionId>> {
        let read = || -> Result<HashSet<QuestionId>> {
            let mut ids = HashSet::new();
            for (_, path) in self.part_files()? {
                for batch in read_batches(&path)? {
                    ids.extend(
                        question_ids(&batch)?
                            .into_iter()
                            .flatten()
                            .filter_map(QuestionId::from_stored),
                    );
                }
            }
            Ok(ids)
        };
        read().map_err(|e| AppError::store_read(&self.root, e))
    }

    fn append(&self, results: &[ScrapeResult]) -> Result<AppendSummary> {
        if results.is_empty() {
            return Ok(AppendSummary {
                rows: 0,
                location: None,
            });
        }

        let path = self
            .write_part(results)
            .map_err(|e| AppError::store_write(&self.root, e))?;
        Ok(AppendSummary {
            rows: results.len(),
            location: Some(path),
        })
    }
}

/// Sequence number of a committed part file name.
fn part_sequence(name: &str) -> Option<u32> {
    name.strip_prefix(PART_PREFIX)?
        .strip_suffix(PART_SUFFIX)?
        .parse()
        .ok()
}

/// Read all record batches of a Parquet file.
pub(crate) fn read_batches(path: &Path) -> Result<Vec<arrow_array::RecordBatch>> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(batches)
}
