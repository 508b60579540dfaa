//! Pipeline stages for a harvesting run.
//!
//! - `reconcile`: Compute pending question IDs from the source and the store
//! - `BatchAccumulator`: Buffer results between flushes
//! - `ScrapePipeline`: Fetch, extract and persist pending timelines

pub mod batch;
pub mod reconcile;
pub mod scrape;

pub use batch::BatchAccumulator;
pub use reconcile::{Reconciliation, pending_ids, reconcile};
pub use scrape::{RunStats, ScrapePipeline};
