use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use knightrehber_models::{reminder::ReminderPayload, settings::PhoneAlarmBackend};

use crate::PlatformReminderService;

/// Device alarm surface used for the phone alarm reminder kind.
#[async_trait]
pub trait PhoneAlarm: Send + Sync + 'static {
    async fn set_alarm(&self, trigger_at: DateTime<Utc>, payload: ReminderPayload) -> anyhow::Result<()>;
}

/// Acknowledges the alarm without ringing anything, for devices with no
/// programmatic alarm API.
pub struct AcknowledgingPhoneAlarm;

#[async_trait]
impl PhoneAlarm for AcknowledgingPhoneAlarm {
    async fn set_alarm(&self, trigger_at: DateTime<Utc>, payload: ReminderPayload) -> anyhow::Result<()> {
        log::info!(
            "Phone alarm acknowledged: {} at {} [event_id = {}]",
            payload.title,
            trigger_at,
            payload.tag
        );
        Ok(())
    }
}

/// Rings through the platform reminder service, so phone alarms are
/// cancelled by event tag exactly like notifications.
pub struct PlatformPhoneAlarm {
    platform: Arc<dyn PlatformReminderService>,
}

impl PlatformPhoneAlarm {
    pub fn new(platform: Arc<dyn PlatformReminderService>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl PhoneAlarm for PlatformPhoneAlarm {
    async fn set_alarm(&self, trigger_at: DateTime<Utc>, payload: ReminderPayload) -> anyhow::Result<()> {
        let handle = self.platform.schedule(trigger_at, payload).await?;
        log::debug!("Phone alarm registered with handle {handle}");
        Ok(())
    }
}

pub fn phone_alarm_for(
    backend: PhoneAlarmBackend,
    platform: Arc<dyn PlatformReminderService>,
) -> Arc<dyn PhoneAlarm> {
    match backend {
        PhoneAlarmBackend::Acknowledge => Arc::new(AcknowledgingPhoneAlarm),
        PhoneAlarmBackend::Platform => Arc::new(PlatformPhoneAlarm::new(platform)),
    }
}
