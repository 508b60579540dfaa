// src/models/selectors.rs

//! CSS selectors for scraping a question timeline.

use serde::{Deserialize, Serialize};

/// CSS selectors and label phrases for scraping a timeline page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSelectors {
    /// Selector for each history row of the timeline
    #[serde(default = "default_row_selector")]
    pub row_selector: String,

    /// Selector for the event label cell within a row
    #[serde(default = "default_label_selector")]
    pub label_selector: String,

    /// Selector for the timestamp element within a row
    #[serde(default = "default_timestamp_selector")]
    pub timestamp_selector: String,

    /// Attribute of the timestamp element holding the absolute time
    #[serde(default = "default_timestamp_attr")]
    pub timestamp_attr: String,

    /// Lower-case label phrase marking a bounty start
    #[serde(default = "default_started_phrase")]
    pub started_phrase: String,

    /// Lower-case label phrase marking a bounty end
    #[serde(default = "default_ended_phrase")]
    pub ended_phrase: String,
}

fn default_row_selector() -> String {
    r#"tr[data-eventtype="history"][class*="datehash"]"#.to_string()
}

fn default_label_selector() -> String {
    "td.wmn1".to_string()
}

fn default_timestamp_selector() -> String {
    "span.relativetime".to_string()
}

fn default_timestamp_attr() -> String {
    "title".to_string()
}

fn default_started_phrase() -> String {
    "bounty started".to_string()
}

fn default_ended_phrase() -> String {
    "bounty ended".to_string()
}

impl Default for TimelineSelectors {
    fn default() -> Self {
        Self {
            row_selector: default_row_selector(),
            label_selector: default_label_selector(),
            timestamp_selector: default_timestamp_selector(),
            timestamp_attr: default_timestamp_attr(),
            started_phrase: default_started_phrase(),
            ended_phrase: default_ended_phrase(),
        }
    }
}
