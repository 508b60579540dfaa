//! Bounty events extracted from a question timeline.

use serde::{Deserialize, Serialize};

/// Kind of bounty lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Started,
    Ended,
}

/// A classified bounty event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountyEvent {
    pub kind: EventKind,

    /// Event timestamp, e.g. `2023-12-05 18:56:51Z`. `None` when the row
    /// carried no timestamp attribute.
    pub timestamp: Option<String>,
}

/// Events of one timeline, split by kind in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineEvents {
    pub bounty_start: Vec<Option<String>>,
    pub bounty_end: Vec<Option<String>>,
}

impl TimelineEvents {
    /// Partition an ordered event list by kind.
    pub fn from_events(events: Vec<BountyEvent>) -> Self {
        let mut out = Self::default();
        for event in events {
            match event.kind {
                EventKind::Started => out.bounty_start.push(event.timestamp),
                EventKind::Ended => out.bounty_end.push(event.timestamp),
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.bounty_start.is_empty() && self.bounty_end.is_empty()
    }
}
