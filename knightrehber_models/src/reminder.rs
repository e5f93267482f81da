use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    alarm::ReminderKind,
    event::{Event, EventId},
    occurrence::{Occurrence, OccurrenceKind},
};

pub type ReminderHandle = u64;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPayload {
    pub title: String,
    pub body: String,
    pub tag: EventId,
    pub occurrence_kind: OccurrenceKind,
    pub reminder_kind: ReminderKind,
}

impl ReminderPayload {
    pub fn for_occurrence(event: &Event, occurrence: &Occurrence, reminder_kind: ReminderKind) -> Self {
        let body = match occurrence.kind {
            OccurrenceKind::FiveMinuteWarning => format!("{} starts in 5 minutes!", event.name),
            OccurrenceKind::ExactStart => format!("{} has started!", event.name),
        };

        Self {
            title: format!("⏰ {}", event.name),
            body,
            tag: event.id.clone(),
            occurrence_kind: occurrence.kind,
            reminder_kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReminder {
    pub handle: ReminderHandle,
    pub trigger_at: DateTime<Utc>,
    pub payload: ReminderPayload,
}

impl fmt::Display for PendingReminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} [{}] {}: {} at {}",
            self.handle, self.payload.tag, self.payload.title, self.payload.body, self.trigger_at
        )
    }
}
