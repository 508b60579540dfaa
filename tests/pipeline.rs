mod common;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bounty_timeline::error::{AppError, Result};
use bounty_timeline::models::{QuestionId, ScrapeResult};
use bounty_timeline::pipeline::{ScrapePipeline, reconcile};
use bounty_timeline::storage::{AppendSummary, ParquetStore, ResultStore};
use common::{FetchLog, Page, ScriptedFetcher, test_config, timeline_page, write_ids};
use tempfile::TempDir;

fn ids_of(results: &[ScrapeResult]) -> Vec<u64> {
    results.iter().map(|r| r.question_id.get()).collect()
}

#[tokio::test]
async fn full_run_persists_every_question_in_batches() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, 2);
    write_ids(&config.ids_path(), &[5, 1, 4, 2, 3]);

    let mut pages = HashMap::new();
    pages.insert(
        2,
        Page::Html(timeline_page(&[
            ("bounty started", "2023-12-05 18:56:51Z"),
            ("edited title", "2023-12-06 08:00:00Z"),
            ("bounty ended", "\"2023-12-12 18:56:51Z\""),
        ])),
    );

    let store = ParquetStore::new(config.results_path());
    let log = Arc::new(Mutex::new(FetchLog::default()));
    let pipeline = ScrapePipeline::new(&config, &store).unwrap();

    let stats = pipeline
        .run(|| async { Ok(ScriptedFetcher::new(pages, Arc::clone(&log))) })
        .await
        .unwrap();

    assert_eq!(stats.pending, 5);
    assert_eq!(stats.attempted, 5);
    assert_eq!(stats.scraped.questions, 5);
    assert_eq!(stats.scraped.with_events, 1);
    assert_eq!(stats.batches_written, 3);
    assert_eq!(stats.rows_written, 5);
    assert!(!stats.aborted);

    let log = log.lock().unwrap();
    assert_eq!(log.connected, 1);
    assert_eq!(log.closed, 1);
    assert_eq!(log.fetched, vec![1, 2, 3, 4, 5]);

    let results = store.load_results().unwrap();
    assert_eq!(ids_of(&results), vec![1, 2, 3, 4, 5]);
    assert_eq!(
        results[1].bounty_start,
        vec![Some("2023-12-05 18:56:51Z".to_string())]
    );
    assert_eq!(
        results[1].bounty_end,
        vec![Some("2023-12-12 18:56:51Z".to_string())]
    );
}

#[tokio::test]
async fn second_run_resumes_without_refetching() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, 10);
    write_ids(&config.ids_path(), &[10, 20, 30]);
    let store = ParquetStore::new(config.results_path());
    let pipeline = ScrapePipeline::new(&config, &store).unwrap();

    let first = Arc::new(Mutex::new(FetchLog::default()));
    pipeline
        .run(|| async { Ok(ScriptedFetcher::new(HashMap::new(), Arc::clone(&first))) })
        .await
        .unwrap();

    let second = Arc::new(Mutex::new(FetchLog::default()));
    let stats = pipeline
        .run(|| async { Ok(ScriptedFetcher::new(HashMap::new(), Arc::clone(&second))) })
        .await
        .unwrap();

    assert_eq!(stats.pending, 0);
    assert_eq!(stats.attempted, 0);
    let second = second.lock().unwrap();
    assert_eq!(second.connected, 0);
    assert!(second.fetched.is_empty());
    assert_eq!(store.load_results().unwrap().len(), 3);
}

#[tokio::test]
async fn transient_failure_is_skipped_and_stays_pending() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, 10);
    write_ids(&config.ids_path(), &[41, 42, 43]);
    let store = ParquetStore::new(config.results_path());
    let pipeline = ScrapePipeline::new(&config, &store).unwrap();

    let mut pages = HashMap::new();
    pages.insert(42, Page::Timeout);
    let log = Arc::new(Mutex::new(FetchLog::default()));

    let stats = pipeline
        .run(|| async { Ok(ScriptedFetcher::new(pages, Arc::clone(&log))) })
        .await
        .unwrap();

    assert_eq!(stats.attempted, 3);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.scraped.questions, 2);
    assert_eq!(ids_of(&store.load_results().unwrap()), vec![41, 43]);

    let work = reconcile(&config.ids_path(), &store).unwrap();
    assert_eq!(work.pending, vec![QuestionId::new(42)]);
    assert_eq!(work.processed, 2);
}

#[tokio::test]
async fn fatal_error_flushes_partial_batch_and_releases_fetcher() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, 10);
    write_ids(&config.ids_path(), &[1, 2, 3, 4, 5]);
    let store = ParquetStore::new(config.results_path());
    let pipeline = ScrapePipeline::new(&config, &store).unwrap();

    let mut pages = HashMap::new();
    pages.insert(3, Page::SessionLost);
    let log = Arc::new(Mutex::new(FetchLog::default()));

    let err = pipeline
        .run(|| async { Ok(ScriptedFetcher::new(pages, Arc::clone(&log))) })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Session(_)));
    let log = log.lock().unwrap();
    assert_eq!(log.fetched, vec![1, 2, 3]);
    assert_eq!(log.closed, 1);
    assert_eq!(ids_of(&store.load_results().unwrap()), vec![1, 2]);
}

#[tokio::test]
async fn missing_source_aborts_before_connecting() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, 10);
    let store = ParquetStore::new(config.results_path());
    let pipeline = ScrapePipeline::new(&config, &store).unwrap();
    let log = Arc::new(Mutex::new(FetchLog::default()));

    let err = pipeline
        .run(|| async { Ok(ScriptedFetcher::new(HashMap::new(), Arc::clone(&log))) })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::SourceUnavailable { .. }));
    assert_eq!(log.lock().unwrap().connected, 0);
}

#[tokio::test]
async fn unreadable_store_is_treated_as_empty() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, 10);
    write_ids(&config.ids_path(), &[7, 8]);

    let root = config.results_path();
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("part-00000.parquet"), b"truncated").unwrap();

    let store = ParquetStore::new(&root);
    let work = reconcile(&config.ids_path(), &store).unwrap();

    assert_eq!(work.total, 2);
    assert_eq!(work.pending, vec![QuestionId::new(7), QuestionId::new(8)]);
}

/// Store that reads as empty and rejects every append.
struct RejectingStore {
    attempts: Mutex<usize>,
}

impl ResultStore for RejectingStore {
    fn exists(&self) -> bool {
        false
    }

    fn processed_ids(&self) -> Result<HashSet<QuestionId>> {
        Ok(HashSet::new())
    }

    fn append(&self, _results: &[ScrapeResult]) -> Result<AppendSummary> {
        *self.attempts.lock().unwrap() += 1;
        Err(AppError::store_write(
            std::path::Path::new("rejecting"),
            "disk full",
        ))
    }
}

#[tokio::test]
async fn store_write_failure_does_not_stop_the_run() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, 2);
    write_ids(&config.ids_path(), &[1, 2, 3, 4, 5]);
    let store = RejectingStore {
        attempts: Mutex::new(0),
    };
    let pipeline = ScrapePipeline::new(&config, &store).unwrap();
    let log = Arc::new(Mutex::new(FetchLog::default()));

    let stats = pipeline
        .run(|| async { Ok(ScriptedFetcher::new(HashMap::new(), Arc::clone(&log))) })
        .await
        .unwrap();

    assert_eq!(stats.attempted, 5);
    assert_eq!(stats.batches_failed, 3);
    assert_eq!(stats.batches_written, 0);
    assert_eq!(stats.rows_written, 0);
    assert_eq!(*store.attempts.lock().unwrap(), 3);
    assert_eq!(log.lock().unwrap().closed, 1);
}

#[tokio::test(start_paused = true)]
async fn delay_precedes_every_fetch_including_after_failures() {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&tmp, 10);
    config.fetcher.delay_secs = 0.5;
    write_ids(&config.ids_path(), &[1, 2, 3, 4]);
    let store = ParquetStore::new(config.results_path());
    let pipeline = ScrapePipeline::new(&config, &store).unwrap();

    let mut pages = HashMap::new();
    pages.insert(2, Page::Timeout);
    let log = Arc::new(Mutex::new(FetchLog::default()));

    let started = tokio::time::Instant::now();
    let stats = pipeline
        .run(|| async { Ok(ScriptedFetcher::new(pages, Arc::clone(&log))) })
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(stats.attempted, 4);
    assert_eq!(stats.skipped, 1);
    assert_eq!(log.lock().unwrap().fetched, vec![1, 2, 3, 4]);
    assert!(
        elapsed >= Duration::from_millis(4 * 500),
        "elapsed {elapsed:?} is shorter than four delays"
    );
}

#[tokio::test]
async fn failed_connect_propagates_and_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, 10);
    write_ids(&config.ids_path(), &[1, 2]);
    let store = ParquetStore::new(config.results_path());
    let pipeline = ScrapePipeline::new(&config, &store).unwrap();

    let err = pipeline
        .run(|| async { Err::<ScriptedFetcher, _>(AppError::session("driver unreachable")) })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Session(_)));
    assert!(!store.exists());
}

#[tokio::test]
async fn out_of_range_delay_fails_before_connecting() {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&tmp, 10);
    config.fetcher.delay_secs = 1e20;
    write_ids(&config.ids_path(), &[1]);
    let store = ParquetStore::new(config.results_path());
    let pipeline = ScrapePipeline::new(&config, &store).unwrap();
    let log = Arc::new(Mutex::new(FetchLog::default()));

    let err = pipeline
        .run(|| async { Ok(ScriptedFetcher::new(HashMap::new(), Arc::clone(&log))) })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(log.lock().unwrap().connected, 0);
}
