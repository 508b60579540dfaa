//! Per-question scrape results.

use serde::{Deserialize, Serialize};

use super::{QuestionId, TimelineEvents};

/// Bounty events harvested for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub question_id: QuestionId,
    pub bounty_start: Vec<Option<String>>,
    pub bounty_end: Vec<Option<String>>,
}

impl ScrapeResult {
    pub fn new(question_id: QuestionId, events: TimelineEvents) -> Self {
        Self {
            question_id,
            bounty_start: events.bounty_start,
            bounty_end: events.bounty_end,
        }
    }

    /// Whether at least one bounty event was found.
    pub fn has_events(&self) -> bool {
        !self.bounty_start.is_empty() || !self.bounty_end.is_empty()
    }
}

/// Outcome of the fetch-and-extract step for one question.
#[derive(Debug)]
pub enum ScrapeOutcome {
    Scraped(ScrapeResult),
    Skipped {
        question_id: QuestionId,
        reason: String,
    },
}

/// Summary counts over a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub questions: usize,
    pub with_events: usize,
    pub start_events: usize,
    pub end_events: usize,
}

impl BatchStats {
    pub fn from_results(results: &[ScrapeResult]) -> Self {
        results.iter().fold(Self::default(), |mut stats, r| {
            stats.record(r);
            stats
        })
    }

    pub fn record(&mut self, result: &ScrapeResult) {
        self.questions += 1;
        self.start_events += result.bounty_start.len();
        self.end_events += result.bounty_end.len();
        if result.has_events() {
            self.with_events += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: u64, starts: usize, ends: usize) -> ScrapeResult {
        ScrapeResult {
            question_id: QuestionId::new(id),
            bounty_start: vec![Some("2024-01-01 00:00:00Z".into()); starts],
            bounty_end: vec![None; ends],
        }
    }

    #[test]
    fn test_batch_stats() {
        let stats = BatchStats::from_results(&[result(1, 2, 1), result(2, 0, 0), result(3, 0, 1)]);
        assert_eq!(
            stats,
            BatchStats {
                questions: 3,
                with_events: 2,
                start_events: 2,
                end_events: 2,
            }
        );
    }
}
