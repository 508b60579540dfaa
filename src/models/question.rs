//! Question identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque positive identifier of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(u64);

impl QuestionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Convert a stored integer, rejecting zero and negative values.
    pub fn from_stored(value: i64) -> Option<Self> {
        (value > 0).then(|| Self(value as u64))
    }

    /// Integer representation used by the columnar store.
    pub fn to_stored(self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for QuestionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
