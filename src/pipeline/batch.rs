// src/pipeline/batch.rs

//! In-memory result batching.

use crate::models::ScrapeResult;

/// Buffers results until the configured batch size is reached.
#[derive(Debug)]
pub struct BatchAccumulator {
    capacity: usize,
    results: Vec<ScrapeResult>,
}

impl BatchAccumulator {
    /// Create an accumulator flushing at `capacity` results (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            results: Vec::with_capacity(capacity.min(4096)),
        }
    }

    pub fn add(&mut self, result: ScrapeResult) {
        self.results.push(result);
    }

    pub fn should_flush(&self) -> bool {
        self.results.len() >= self.capacity
    }

    /// Take the buffered results, leaving the accumulator empty.
    pub fn drain(&mut self) -> Vec<ScrapeResult> {
        std::mem::take(&mut self.results)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
