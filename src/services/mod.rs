//! Service layer for the bounty harvester.
//!
//! This module contains:
//! - Page fetching (`PageFetcher`, `HttpFetcher`, `WebDriverFetcher`)
//! - Timeline event extraction (`TimelineExtractor`)

mod fetcher;
mod timeline;
mod webdriver;

pub use fetcher::{HttpFetcher, PageFetcher, connect};
pub use timeline::{TimelineExtractor, clean_timestamp};
pub use webdriver::WebDriverFetcher;
