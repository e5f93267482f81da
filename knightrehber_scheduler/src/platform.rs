use async_trait::async_trait;
use chrono::{DateTime, Utc};
use knightrehber_models::reminder::{PendingReminder, PermissionStatus, ReminderHandle, ReminderPayload};

/// One-shot reminders registered with the device.
#[async_trait]
pub trait PlatformReminderService: Send + Sync + 'static {
    async fn schedule(
        &self,
        trigger_at: DateTime<Utc>,
        payload: ReminderPayload,
    ) -> anyhow::Result<ReminderHandle>;

    /// Cancelling a reminder that is no longer pending is not an error.
    async fn cancel(&self, handle: ReminderHandle) -> anyhow::Result<()>;

    async fn list_pending(&self) -> anyhow::Result<Vec<PendingReminder>>;

    async fn permission_status(&self) -> PermissionStatus;

    async fn request_permission(&self) -> PermissionStatus;
}
