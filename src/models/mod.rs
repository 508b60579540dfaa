// src/models/mod.rs

//! Domain models for the bounty harvester.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod event;
mod question;
mod result;
mod selectors;

// Re-export all public types
pub use config::{BatchConfig, Config, FetcherConfig, LoggingConfig, PathsConfig};
pub use event::{BountyEvent, EventKind, TimelineEvents};
pub use question::QuestionId;
pub use result::{BatchStats, ScrapeOutcome, ScrapeResult};
pub use selectors::TimelineSelectors;
