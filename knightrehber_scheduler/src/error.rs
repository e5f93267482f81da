use knightrehber_models::{alarm::ReminderKind, event::{Event, EventId}};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlarmError {
    #[error("You must sign in to use event alarms.")]
    NotAuthenticated,

    #[error("Notification permission is required to use event alarms.")]
    PermissionDenied,

    #[error("Unknown event {0}")]
    UnknownEvent(EventId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationReport {
    pub reminder_kind: ReminderKind,
    pub registered: usize,
    pub failed: usize,
}

impl ActivationReport {
    pub fn new(reminder_kind: ReminderKind) -> Self {
        Self {
            reminder_kind,
            registered: 0,
            failed: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeactivationReport {
    pub cancelled: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Activated(ActivationReport),
    Deactivated(DeactivationReport),
}

impl ToggleOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            ToggleOutcome::Activated(report) => report.is_success(),
            ToggleOutcome::Deactivated(_) => true,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ToggleOutcome::Activated(_))
    }

    /// Text shown to the user once the toggle finished.
    pub fn message(&self, event: &Event) -> String {
        match self {
            ToggleOutcome::Deactivated(_) => format!("Alarms for {} are switched off.", event.name),
            ToggleOutcome::Activated(report) if report.is_success() => {
                let times = event
                    .times
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "Alarms set for {}!\n\nTimes: {}\n\nYou will get a {} 5 minutes before and at the start.",
                    event.name, times, report.reminder_kind
                )
            }
            ToggleOutcome::Activated(report) if report.registered == 0 => {
                format!("An error occurred while setting alarms for {}.", event.name)
            }
            ToggleOutcome::Activated(report) => format!(
                "Alarms for {} were only partly set: {} of {} reminders could not be registered.",
                event.name,
                report.failed,
                report.registered + report.failed
            ),
        }
    }
}
