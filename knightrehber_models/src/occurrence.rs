use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of an event start a reminder fires on. Warnings sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceKind {
    FiveMinuteWarning,
    ExactStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Occurrence {
    pub instant: DateTime<Utc>,
    pub kind: OccurrenceKind,
}

impl Occurrence {
    pub fn new(instant: DateTime<Utc>, kind: OccurrenceKind) -> Self {
        Self { instant, kind }
    }
}
