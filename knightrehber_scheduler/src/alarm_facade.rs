use std::sync::{Arc, Mutex, PoisonError};

use knightrehber_models::{
    alarm::{AlarmRecord, ReminderKind},
    event::{Event, EventId},
    user::{SessionUser, UserId},
};

use crate::{
    AlarmError, PlatformReminderService, ReminderScheduler, SessionProvider, ToggleOutcome,
};

/// Entry point for the alarm switches: resolves the current user, checks
/// the notification permission and hands the toggle to the scheduler.
pub struct AlarmFacade {
    session: Arc<dyn SessionProvider>,
    scheduler: Arc<ReminderScheduler>,
    platform: Arc<dyn PlatformReminderService>,
    reminder_kind: Mutex<ReminderKind>,
}

impl AlarmFacade {
    pub fn new(
        session: Arc<dyn SessionProvider>,
        scheduler: Arc<ReminderScheduler>,
        platform: Arc<dyn PlatformReminderService>,
    ) -> Self {
        Self {
            session,
            scheduler,
            platform,
            reminder_kind: Mutex::new(ReminderKind::default()),
        }
    }

    /// Reminder kind used for the next activation. Not persisted.
    pub fn reminder_kind(&self) -> ReminderKind {
        *self.reminder_kind.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_reminder_kind(&self, kind: ReminderKind) {
        *self.reminder_kind.lock().unwrap_or_else(PoisonError::into_inner) = kind;
        log::debug!("Reminder kind set to {kind}");
    }

    /// Loads the persisted alarms of the signed-in user. Call after sign in.
    pub async fn load_current_user(&self) -> Result<SessionUser, AlarmError> {
        let user = self.current_user()?;
        self.scheduler.load_user(&user.id).await;
        Ok(user)
    }

    /// Drops the in-memory alarms of a user that signed out.
    pub async fn release_user(&self, user_id: &UserId) {
        self.scheduler.forget_user(user_id).await;
    }

    pub async fn is_active(&self, event_id: &EventId) -> bool {
        match self.current_user() {
            Ok(user) => self.scheduler.is_active(&user.id, event_id).await,
            Err(_) => false,
        }
    }

    pub async fn record(&self, event_id: &EventId) -> Option<AlarmRecord> {
        let user = self.current_user().ok()?;
        self.scheduler.record(&user.id, event_id).await
    }

    /// Catalog events with an armed alarm, in catalog order.
    pub async fn active_alarms(&self) -> Vec<(Event, AlarmRecord)> {
        let Ok(user) = self.current_user() else {
            return Vec::new();
        };

        let state = self.scheduler.state(&user.id).await;
        self.scheduler
            .catalog()
            .events()
            .iter()
            .filter_map(|event| {
                state
                    .get(&event.id)
                    .map(|record| (event.clone(), record.clone()))
            })
            .collect()
    }

    pub async fn toggle(&self, event_id: &EventId) -> Result<ToggleOutcome, AlarmError> {
        let user = self.current_user()?;
        self.scheduler.event(event_id)?;
        let reminder_kind = self.reminder_kind();

        let activating = !self.scheduler.is_active(&user.id, event_id).await;
        if activating && reminder_kind == ReminderKind::Notification {
            self.ensure_permission().await?;
        }

        self.scheduler
            .toggle(&user.id, event_id, reminder_kind)
            .await
    }

    /// Re-registers the reminders of every active alarm of the current user
    /// with the kind each one was armed with. Returns how many were re-armed.
    pub async fn rearm_active(&self) -> Result<usize, AlarmError> {
        let user = self.current_user()?;
        let state = self.scheduler.state(&user.id).await;
        let permission = self.platform.permission_status().await;

        let mut rearmed = 0;
        for (event_id, record) in state.iter() {
            if self.scheduler.event(event_id).is_err() {
                log::warn!("Dropping alarm of retired event {event_id}");
                self.scheduler.discard(&user.id, event_id).await;
                continue;
            }

            if record.reminder_kind == ReminderKind::Notification && !permission.is_granted() {
                log::warn!("Notification permission missing, not re-arming {event_id}");
                continue;
            }

            match self
                .scheduler
                .activate(&user.id, event_id, record.reminder_kind)
                .await
            {
                Ok(report) => {
                    rearmed += 1;
                    if !report.is_success() {
                        log::warn!("Re-armed {event_id} with {} failed reminders", report.failed);
                    }
                }
                Err(e) => log::warn!("Could not re-arm {event_id}: {e}"),
            }
        }

        Ok(rearmed)
    }

    fn current_user(&self) -> Result<SessionUser, AlarmError> {
        match self.session.current_user() {
            Some(user) if user.can_use_alarms() => Ok(user),
            _ => Err(AlarmError::NotAuthenticated),
        }
    }

    async fn ensure_permission(&self) -> Result<(), AlarmError> {
        if self.platform.permission_status().await.is_granted() {
            return Ok(());
        }

        let answer = self.platform.request_permission().await;
        if answer.is_granted() {
            Ok(())
        } else {
            log::info!("Notification permission refused: {answer:?}");
            Err(AlarmError::PermissionDenied)
        }
    }
}
