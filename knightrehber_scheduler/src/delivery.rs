use async_trait::async_trait;
use knightrehber_models::reminder::PendingReminder;

#[async_trait]
pub trait ReminderDeliveryChannel: Send + Sync + 'static {
    async fn send_reminder_notification(&self, reminder: &PendingReminder);
}

pub struct LogDeliveryChannel;

#[async_trait]
impl ReminderDeliveryChannel for LogDeliveryChannel {
    async fn send_reminder_notification(&self, reminder: &PendingReminder) {
        log::info!(
            "[{:?}] {} {} [event_id = {}]",
            reminder.payload.reminder_kind,
            reminder.payload.title,
            reminder.payload.body,
            reminder.payload.tag
        );
    }
}
