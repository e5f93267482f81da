mod alarm_facade;
mod clock;
mod delivery;
mod error;
mod local_reminder_service;
pub mod occurrence;
mod phone_alarm;
mod platform;
mod reminder_scheduler;
mod session;

#[cfg(test)]
mod test_utils;

pub use alarm_facade::AlarmFacade;
pub use clock::{Clock, FixedClock, SystemClock};
pub use delivery::{LogDeliveryChannel, ReminderDeliveryChannel};
pub use error::{ActivationReport, AlarmError, DeactivationReport, ToggleOutcome};
pub use local_reminder_service::LocalReminderService;
pub use occurrence::{compute_occurrences, compute_occurrences_within};
pub use phone_alarm::{AcknowledgingPhoneAlarm, PhoneAlarm, PlatformPhoneAlarm, phone_alarm_for};
pub use platform::PlatformReminderService;
pub use reminder_scheduler::ReminderScheduler;
pub use session::{InMemorySession, SessionProvider};
