use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use knightrehber_models::reminder::{PendingReminder, PermissionStatus, ReminderHandle, ReminderPayload};
use tokio::{sync::RwLock, task};
use tokio_util::sync::CancellationToken;

use crate::{PlatformReminderService, ReminderDeliveryChannel};

struct ScheduledReminderHandle {
    reminder: PendingReminder,
    cancellation_token: CancellationToken,
}

type ReminderTaskStore = RwLock<HashMap<ReminderHandle, ScheduledReminderHandle>>;

/// In-process reminder service: every reminder is a task sleeping until its
/// trigger instant, then handing the reminder to the delivery channel.
pub struct LocalReminderService {
    tasks: Arc<ReminderTaskStore>,
    next_handle: AtomicU64,
    delivery_channel: Arc<dyn ReminderDeliveryChannel>,
    permission: RwLock<PermissionStatus>,
    grant_on_request: bool,
    shutdown: CancellationToken,
}

impl LocalReminderService {
    pub fn new(delivery_channel: Arc<dyn ReminderDeliveryChannel>) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            next_handle: AtomicU64::new(1),
            delivery_channel,
            permission: RwLock::new(PermissionStatus::Undetermined),
            grant_on_request: true,
            shutdown: CancellationToken::new(),
        }
    }

    /// Sets the starting permission status and how a permission prompt is answered.
    pub fn with_permission(mut self, status: PermissionStatus, grant_on_request: bool) -> Self {
        self.permission = RwLock::new(status);
        self.grant_on_request = grant_on_request;
        self
    }

    fn spawn_reminder_task(
        &self,
        handle: ReminderHandle,
        delay: std::time::Duration,
        cancellation_token: CancellationToken,
    ) {
        let tasks = Arc::clone(&self.tasks);
        let delivery_channel = Arc::clone(&self.delivery_channel);

        task::spawn(async move {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    log::debug!("Reminder {handle} cancelled before firing");
                }
                _ = tokio::time::sleep(delay) => {
                    let fired = tasks.write().await.remove(&handle);
                    if let Some(fired) = fired {
                        log::info!("[FIRE] Delivering reminder {}", fired.reminder);
                        delivery_channel.send_reminder_notification(&fired.reminder).await;
                    }
                }
            }
        });
    }
}

impl Drop for LocalReminderService {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl PlatformReminderService for LocalReminderService {
    async fn schedule(
        &self,
        trigger_at: DateTime<Utc>,
        payload: ReminderPayload,
    ) -> anyhow::Result<ReminderHandle> {
        let delay = (trigger_at - Utc::now())
            .to_std()
            .map_err(|_| anyhow::anyhow!("Trigger time {trigger_at} is in the past"))?;

        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let cancellation_token = self.shutdown.child_token();
        let reminder = PendingReminder {
            handle,
            trigger_at,
            payload,
        };

        log::info!("[SCHEDULE] Sleeping for {delay:?}. {reminder}");

        // The task removes its own entry when it fires, so the entry has to
        // be in place before the task can observe it.
        let mut tasks = self.tasks.write().await;
        self.spawn_reminder_task(handle, delay, cancellation_token.clone());
        tasks.insert(
            handle,
            ScheduledReminderHandle {
                reminder,
                cancellation_token,
            },
        );

        Ok(handle)
    }

    async fn cancel(&self, handle: ReminderHandle) -> anyhow::Result<()> {
        match self.tasks.write().await.remove(&handle) {
            Some(scheduled) => {
                scheduled.cancellation_token.cancel();
                log::info!("[CANCEL] {}", scheduled.reminder);
            }
            None => log::debug!("Reminder {handle} is not pending, nothing to cancel"),
        }

        Ok(())
    }

    async fn list_pending(&self) -> anyhow::Result<Vec<PendingReminder>> {
        let tasks = self.tasks.read().await;
        let mut pending: Vec<PendingReminder> = tasks.values().map(|t| t.reminder.clone()).collect();
        pending.sort_by_key(|reminder| (reminder.trigger_at, reminder.handle));

        Ok(pending)
    }

    async fn permission_status(&self) -> PermissionStatus {
        *self.permission.read().await
    }

    async fn request_permission(&self) -> PermissionStatus {
        let mut permission = self.permission.write().await;
        if *permission == PermissionStatus::Undetermined {
            *permission = if self.grant_on_request {
                PermissionStatus::Granted
            } else {
                PermissionStatus::Denied
            };
            log::info!("Notification permission answered: {:?}", *permission);
        }

        *permission
    }
}
