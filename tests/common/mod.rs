#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};

use arrow_array::{ArrayRef, Int64Array, RecordBatch};
use async_trait::async_trait;
use bounty_timeline::error::{AppError, Result};
use bounty_timeline::models::{Config, QuestionId};
use bounty_timeline::services::PageFetcher;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

/// Config rooted in a temp dir, with no delay and quiet progress.
pub fn test_config(tmp: &TempDir, batch_size: usize) -> Config {
    let mut config = Config::default();
    config.paths.input_dir = tmp.path().join("input_data");
    config.paths.output_dir = tmp.path().join("output_data");
    config.batch.size = batch_size;
    config.fetcher.delay_secs = 0.0;
    config.logging.show_progress = false;
    std::fs::create_dir_all(&config.paths.input_dir).unwrap();
    config
}

/// Write a question ID source file.
pub fn write_ids(path: &Path, ids: &[i64]) {
    let column: ArrayRef = Arc::new(Int64Array::from(ids.to_vec()));
    let batch = RecordBatch::try_from_iter(vec![("question_id", column)]).unwrap();
    let mut writer =
        ArrowWriter::try_new(File::create(path).unwrap(), batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// A timeline page with one history row per `(label, timestamp)`.
pub fn timeline_page(rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .enumerate()
        .map(|(i, (label, ts))| {
            format!(
                r#"<tr class="datehash-{i}" data-eventtype="history">
                     <td><span class="relativetime" title="{ts}">{ts}</span></td>
                     <td class="wmn1">{label}</td>
                   </tr>"#
            )
        })
        .collect();
    format!("<html><body><table>{rows}</table></body></html>")
}

/// Scripted response for one question.
#[derive(Clone)]
pub enum Page {
    Html(String),
    Timeout,
    SessionLost,
}

/// What the pipeline did with the fetcher.
#[derive(Debug, Default)]
pub struct FetchLog {
    pub connected: usize,
    pub fetched: Vec<u64>,
    pub closed: usize,
}

/// In-memory fetcher serving scripted pages. Unknown IDs get an empty page.
pub struct ScriptedFetcher {
    pages: HashMap<u64, Page>,
    log: Arc<Mutex<FetchLog>>,
}

impl ScriptedFetcher {
    pub fn new(pages: HashMap<u64, Page>, log: Arc<Mutex<FetchLog>>) -> Self {
        log.lock().unwrap().connected += 1;
        Self { pages, log }
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&mut self, question_id: QuestionId) -> Result<String> {
        self.log.lock().unwrap().fetched.push(question_id.get());
        match self.pages.get(&question_id.get()) {
            Some(Page::Html(html)) => Ok(html.clone()),
            Some(Page::Timeout) => Err(AppError::fetch(question_id, "page load timed out")),
            Some(Page::SessionLost) => Err(AppError::session("invalid session id")),
            None => Ok(timeline_page(&[])),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().unwrap().closed += 1;
        Ok(())
    }
}
