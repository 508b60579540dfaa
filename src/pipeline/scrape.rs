// src/pipeline/scrape.rs

//! Timeline scraping pipeline.
//!
//! ```text
//! Idle → Reconciling ─┬─ nothing pending ─────────────────→ Done
//!                     └─ FetchingLoop → Draining → (release fetcher) → Done
//! ```
//!
//! Per-question fetch failures are skipped and stay pending for the next run.
//! Any other error aborts the loop; the partial batch is still flushed and
//! the fetcher still released before the error is returned.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;

use super::batch::BatchAccumulator;
use super::reconcile::reconcile;
use crate::error::Result;
use crate::models::{BatchStats, Config, QuestionId, ScrapeOutcome, ScrapeResult};
use crate::services::{PageFetcher, TimelineExtractor};
use crate::storage::ResultStore;

/// Aggregate statistics of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// IDs pending after reconciliation
    pub pending: usize,
    /// IDs a fetch was attempted for
    pub attempted: usize,
    /// IDs skipped after a transient fetch error
    pub skipped: usize,
    /// Counts over successfully scraped questions
    pub scraped: BatchStats,
    pub batches_written: usize,
    pub batches_failed: usize,
    pub rows_written: usize,
    /// Whether the fetch loop ended early on a fatal error
    pub aborted: bool,
}

/// Drives reconciliation, fetching, extraction and batched persistence.
pub struct ScrapePipeline<'a> {
    config: &'a Config,
    store: &'a dyn ResultStore,
    extractor: TimelineExtractor,
}

impl<'a> ScrapePipeline<'a> {
    pub fn new(config: &'a Config, store: &'a dyn ResultStore) -> Result<Self> {
        Ok(Self {
            config,
            store,
            extractor: TimelineExtractor::new(&config.selectors)?,
        })
    }

    /// Run to completion.
    ///
    /// `connect` is only invoked when reconciliation leaves work to do. The
    /// fetcher it returns is closed exactly once before this returns.
    pub async fn run<P, C, Fut>(&self, connect: C) -> Result<RunStats>
    where
        P: PageFetcher,
        C: FnOnce() -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        let started = Utc::now();
        log::info!("Starting bounty timeline scraping at {}", started);

        let work = reconcile(&self.config.ids_path(), self.store)?;
        let mut stats = RunStats {
            pending: work.pending.len(),
            ..RunStats::default()
        };

        if work.pending.is_empty() {
            log::info!("No unprocessed question IDs found. Exiting.");
            return Ok(stats);
        }

        let delay = self.config.fetcher.delay()?;
        let mut fetcher = match connect().await {
            Ok(fetcher) => fetcher,
            Err(e) => {
                stats.aborted = true;
                log::error!("Failed to start fetcher: {}", e);
                log_run_summary(&stats, started);
                return Err(e);
            }
        };
        let mut batch = BatchAccumulator::new(self.config.batch.size);

        let outcome = self
            .fetch_loop(&mut fetcher, &work.pending, delay, &mut batch, &mut stats)
            .await;
        if let Err(e) = &outcome {
            stats.aborted = true;
            log::error!("Unexpected error during scraping: {}", e);
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &mut stats);
        }

        match fetcher.close().await {
            Ok(()) => log::info!("Fetcher closed"),
            Err(e) => log::warn!("Failed to close fetcher: {}", e),
        }

        log_run_summary(&stats, started);
        outcome.map(|()| stats)
    }

    /// Fetch and extract one question.
    ///
    /// Transient fetch errors become [`ScrapeOutcome::Skipped`]; other errors
    /// are returned.
    pub async fn scrape_one<P>(
        &self,
        fetcher: &mut P,
        question_id: QuestionId,
    ) -> Result<ScrapeOutcome>
    where
        P: PageFetcher + ?Sized,
    {
        match fetcher.fetch(question_id).await {
            Ok(html) => {
                let events = self.extractor.extract_html(&html);
                Ok(ScrapeOutcome::Scraped(ScrapeResult::new(question_id, events)))
            }
            Err(e) if e.is_transient() => Ok(ScrapeOutcome::Skipped {
                question_id,
                reason: e.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn fetch_loop<P: PageFetcher>(
        &self,
        fetcher: &mut P,
        pending: &[QuestionId],
        delay: Duration,
        batch: &mut BatchAccumulator,
        stats: &mut RunStats,
    ) -> Result<()> {
        let logging = &self.config.logging;

        for &question_id in pending {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            stats.attempted += 1;
            match self.scrape_one(&mut *fetcher, question_id).await? {
                ScrapeOutcome::Scraped(result) => {
                    stats.scraped.record(&result);
                    batch.add(result);
                    if batch.should_flush() {
                        self.flush(batch, stats);
                    }
                }
                ScrapeOutcome::Skipped {
                    question_id,
                    reason,
                } => {
                    stats.skipped += 1;
                    log::error!("Skipping question_id={}: {}", question_id, reason);
                }
            }

            if logging.show_progress && stats.attempted % logging.progress_interval.max(1) == 0 {
                log::info!(
                    "Progress: {}/{} attempted ({} scraped, {} skipped)",
                    stats.attempted,
                    stats.pending,
                    stats.scraped.questions,
                    stats.skipped
                );
            }
        }

        Ok(())
    }

    /// Drain the accumulator into the store. Failures are logged, not raised.
    fn flush(&self, batch: &mut BatchAccumulator, stats: &mut RunStats) {
        let results = batch.drain();
        let batch_stats = BatchStats::from_results(&results);

        match self.store.append(&results) {
            Ok(summary) => {
                stats.batches_written += 1;
                stats.rows_written += summary.rows;
                log::info!(
                    "Batch statistics: {} questions processed, {} had bounty events ({} start events, {} end events)",
                    batch_stats.questions,
                    batch_stats.with_events,
                    batch_stats.start_events,
                    batch_stats.end_events
                );
                if let Some(location) = summary.location {
                    log::info!(
                        "Saved batch of {} results to {}",
                        summary.rows,
                        location.display()
                    );
                }
            }
            Err(e) => {
                stats.batches_failed += 1;
                log::error!("{} ({} results not persisted)", e, results.len());
            }
        }
    }
}

fn log_run_summary(stats: &RunStats, started: chrono::DateTime<Utc>) {
    let elapsed = Utc::now() - started;
    log::info!(
        "Run statistics: {}/{} attempted, {} scraped, {} skipped, {} with bounty events ({} start events, {} end events)",
        stats.attempted,
        stats.pending,
        stats.scraped.questions,
        stats.skipped,
        stats.scraped.with_events,
        stats.scraped.start_events,
        stats.scraped.end_events
    );
    log::info!(
        "Persisted {} rows in {} batches ({} batches failed)",
        stats.rows_written,
        stats.batches_written,
        stats.batches_failed
    );
    if stats.aborted {
        log::warn!("Scraping aborted early; remaining IDs stay pending for the next run");
    } else {
        log::info!("Completed scraping all unprocessed question IDs");
    }
    log::info!(
        "Total execution time: {:.1}s",
        elapsed.num_milliseconds() as f64 / 1000.0
    );
}
