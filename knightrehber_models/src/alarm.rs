use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::EventId;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReminderKind {
    #[default]
    #[serde(rename = "notification")]
    Notification,
    #[serde(rename = "phone")]
    PhoneAlarm,
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderKind::Notification => f.write_str("notification"),
            ReminderKind::PhoneAlarm => f.write_str("phone alarm"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub active: bool,
    #[serde(rename = "type")]
    pub reminder_kind: ReminderKind,
    #[serde(rename = "lastScheduled")]
    pub last_scheduled_at: DateTime<Utc>,
}

impl AlarmRecord {
    pub fn armed(reminder_kind: ReminderKind, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            active: true,
            reminder_kind,
            last_scheduled_at: scheduled_at,
        }
    }
}

/// Alarm records of one user, keyed by event.
///
/// Only armed events have an entry: disarming an event removes its record
/// instead of flagging it inactive.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmState(BTreeMap<EventId, AlarmRecord>);

impl AlarmState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, event_id: &EventId) -> Option<&AlarmRecord> {
        self.0.get(event_id)
    }

    pub fn is_active(&self, event_id: &EventId) -> bool {
        self.get(event_id).is_some_and(|record| record.active)
    }

    /// Stores `record` for the event. An inactive record removes the entry.
    pub fn put(mut self, event_id: EventId, record: AlarmRecord) -> Self {
        if record.active {
            self.0.insert(event_id, record);
        } else {
            self.0.remove(&event_id);
        }
        self
    }

    pub fn remove(mut self, event_id: &EventId) -> Self {
        self.0.remove(event_id);
        self
    }

    /// Drops records persisted with `active: false`.
    pub fn normalized(mut self) -> Self {
        self.0.retain(|_, record| record.active);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EventId, &AlarmRecord)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn scheduled_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap()
    }

    #[test]
    fn put_inactive_record_removes_entry() {
        let id = EventId::new("csw");
        let state = AlarmState::new().put(id.clone(), AlarmRecord::armed(ReminderKind::Notification, scheduled_at()));
        assert!(state.is_active(&id));

        let inactive = AlarmRecord {
            active: false,
            ..AlarmRecord::armed(ReminderKind::Notification, scheduled_at())
        };
        let state = state.put(id.clone(), inactive);

        assert!(state.get(&id).is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn serialized_shape() {
        let state = AlarmState::new().put(
            EventId::new("bdw"),
            AlarmRecord::armed(ReminderKind::PhoneAlarm, scheduled_at()),
        );

        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "bdw": {
                    "active": true,
                    "type": "phone",
                    "lastScheduled": "2025-06-01T17:00:00Z"
                }
            })
        );
    }

    #[test]
    fn normalizing_drops_inactive_records() {
        let json = r#"{
            "bdw": {"active": true, "type": "notification", "lastScheduled": "2025-06-01T17:00:00.000Z"},
            "chaos": {"active": false, "type": "phone", "lastScheduled": "2025-06-01T17:00:00.000Z"}
        }"#;

        let state: AlarmState = serde_json::from_str(json).unwrap();
        let state = state.normalized();

        assert_eq!(state.len(), 1);
        assert!(state.is_active(&EventId::new("bdw")));
        assert!(!state.is_active(&EventId::new("chaos")));
    }
}
