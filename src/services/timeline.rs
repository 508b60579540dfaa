// src/services/timeline.rs

//! Timeline event extraction.
//!
//! Turns a rendered timeline page into the ordered bounty events it lists.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{BountyEvent, EventKind, TimelineEvents, TimelineSelectors};

/// Characters stripped from both ends of a timestamp attribute.
const TIMESTAMP_WRAPPERS: &[char] = &['"', '\'', '[', ']'];

/// A history row reduced to the two values classification needs.
struct RawTimelineRow {
    label: String,
    timestamp: Option<String>,
}

/// Extracts bounty events from rendered timeline documents.
#[derive(Debug, Clone)]
pub struct TimelineExtractor {
    row_sel: Selector,
    label_sel: Selector,
    timestamp_sel: Selector,
    timestamp_attr: String,
    started_phrase: String,
    ended_phrase: String,
}

impl TimelineExtractor {
    /// Compile the configured selectors.
    pub fn new(selectors: &TimelineSelectors) -> Result<Self> {
        Ok(Self {
            row_sel: Self::parse_selector(&selectors.row_selector)?,
            label_sel: Self::parse_selector(&selectors.label_selector)?,
            timestamp_sel: Self::parse_selector(&selectors.timestamp_selector)?,
            timestamp_attr: selectors.timestamp_attr.clone(),
            started_phrase: selectors.started_phrase.to_lowercase(),
            ended_phrase: selectors.ended_phrase.to_lowercase(),
        })
    }

    /// Parse raw page source and extract its events, split by kind.
    pub fn extract_html(&self, html: &str) -> TimelineEvents {
        let document = Html::parse_document(html);
        TimelineEvents::from_events(self.extract(&document))
    }

    /// Extract classified bounty events in document order.
    pub fn extract(&self, document: &Html) -> Vec<BountyEvent> {
        let mut events = Vec::new();

        for row in document.select(&self.row_sel) {
            let Some(raw) = self.read_row(&row) else {
                continue;
            };

            let label = raw.label.to_lowercase();
            log::debug!(
                "Timeline row '{}' at {}",
                raw.label,
                raw.timestamp.as_deref().unwrap_or("<none>")
            );

            // A label may match both phrases; each match is recorded.
            if label.contains(&self.started_phrase) {
                events.push(BountyEvent {
                    kind: EventKind::Started,
                    timestamp: raw.timestamp.clone(),
                });
            }
            if label.contains(&self.ended_phrase) {
                events.push(BountyEvent {
                    kind: EventKind::Ended,
                    timestamp: raw.timestamp.clone(),
                });
            }
        }

        events
    }

    /// Read the label and timestamp of a row; `None` if either cell is absent.
    fn read_row(&self, row: &ElementRef) -> Option<RawTimelineRow> {
        let label_elem = row.select(&self.label_sel).next()?;
        let timestamp_elem = row.select(&self.timestamp_sel).next()?;

        let label = normalize_whitespace(&label_elem.text().collect::<String>());
        let timestamp = timestamp_elem
            .value()
            .attr(&self.timestamp_attr)
            .map(clean_timestamp);

        Some(RawTimelineRow { label, timestamp })
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

/// Strip enclosing quote and bracket characters from a timestamp.
pub fn clean_timestamp(raw: &str) -> String {
    raw.trim_matches(TIMESTAMP_WRAPPERS).to_string()
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
