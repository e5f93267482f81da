use std::{collections::HashMap, sync::Arc};

use chrono_tz::Tz;
use knightrehber_models::{
    alarm::{AlarmRecord, AlarmState, ReminderKind},
    catalog::EventCatalog,
    event::{Event, EventId},
    occurrence::Occurrence,
    reminder::ReminderPayload,
    user::UserId,
};
use knightrehber_storage::AlarmStateStore;
use tokio::sync::{Mutex, RwLock};

use crate::{
    ActivationReport, AlarmError, Clock, DeactivationReport, PhoneAlarm, PlatformReminderService,
    SystemClock, ToggleOutcome, compute_occurrences_within,
};

/// Arms and disarms event reminders for signed-in users.
///
/// Keeps every loaded user's `AlarmState` in memory and writes it through the
/// store after each change. Operations on different events of the same user
/// only touch their own entry.
pub struct ReminderScheduler {
    catalog: Arc<EventCatalog>,
    store: AlarmStateStore,
    platform: Arc<dyn PlatformReminderService>,
    phone_alarm: Arc<dyn PhoneAlarm>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    horizon_days: u32,
    states: RwLock<HashMap<UserId, AlarmState>>,
    save_lock: Mutex<()>,
}

impl ReminderScheduler {
    pub fn new(
        catalog: Arc<EventCatalog>,
        store: AlarmStateStore,
        platform: Arc<dyn PlatformReminderService>,
        phone_alarm: Arc<dyn PhoneAlarm>,
    ) -> Self {
        Self {
            catalog,
            store,
            platform,
            phone_alarm,
            clock: Arc::new(SystemClock),
            timezone: chrono_tz::Europe::Istanbul,
            horizon_days: 1,
            states: RwLock::new(HashMap::new()),
            save_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_horizon_days(mut self, horizon_days: u32) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn event(&self, event_id: &EventId) -> Result<&Event, AlarmError> {
        self.catalog
            .get(event_id)
            .ok_or_else(|| AlarmError::UnknownEvent(event_id.clone()))
    }

    /// Reads the persisted state of `user_id` into memory, replacing any
    /// copy already held.
    pub async fn load_user(&self, user_id: &UserId) -> AlarmState {
        let state = self.store.load(user_id).await;
        log::info!("Loaded {} active alarms for user {user_id}", state.len());

        self.states
            .write()
            .await
            .insert(user_id.clone(), state.clone());
        state
    }

    /// Drops the in-memory copy. The persisted state is kept for the next
    /// sign in.
    pub async fn forget_user(&self, user_id: &UserId) {
        if self.states.write().await.remove(user_id).is_some() {
            log::debug!("Released in-memory alarms of user {user_id}");
        }
    }

    pub async fn state(&self, user_id: &UserId) -> AlarmState {
        if let Some(state) = self.states.read().await.get(user_id) {
            return state.clone();
        }

        self.load_user(user_id).await
    }

    pub async fn is_active(&self, user_id: &UserId, event_id: &EventId) -> bool {
        self.state(user_id).await.is_active(event_id)
    }

    pub async fn record(&self, user_id: &UserId, event_id: &EventId) -> Option<AlarmRecord> {
        AlarmStateStore::get(&self.state(user_id).await, event_id).cloned()
    }

    pub async fn toggle(
        &self,
        user_id: &UserId,
        event_id: &EventId,
        reminder_kind: ReminderKind,
    ) -> Result<ToggleOutcome, AlarmError> {
        if self.is_active(user_id, event_id).await {
            let report = self.deactivate(user_id, event_id).await?;
            Ok(ToggleOutcome::Deactivated(report))
        } else {
            let report = self.activate(user_id, event_id, reminder_kind).await?;
            Ok(ToggleOutcome::Activated(report))
        }
    }

    /// Registers today's reminders for the event and marks it active.
    ///
    /// Registration failures are counted per occurrence; reminders that were
    /// registered stay registered and the record is written either way.
    pub async fn activate(
        &self,
        user_id: &UserId,
        event_id: &EventId,
        reminder_kind: ReminderKind,
    ) -> Result<ActivationReport, AlarmError> {
        let event = self.event(event_id)?;

        self.cancel_pending(event_id).await;

        let now = self.clock.now();
        let occurrences = compute_occurrences_within(
            event,
            &now.with_timezone(&self.timezone),
            self.horizon_days,
        );

        let mut report = ActivationReport::new(reminder_kind);
        for occurrence in &occurrences {
            match self.register(event, occurrence, reminder_kind).await {
                Ok(()) => report.registered += 1,
                Err(e) => {
                    report.failed += 1;
                    log::error!(
                        "Failed to register reminder. [event_id = {event_id}, trigger_at = {}, error = {e:?}]",
                        occurrence.instant
                    );
                }
            }
        }

        if occurrences.is_empty() {
            log::info!("No upcoming occurrences of {event_id} within the horizon, nothing registered");
        }

        self.update_state(user_id, |state| {
            AlarmStateStore::put(state, event_id.clone(), AlarmRecord::armed(reminder_kind, now))
        })
        .await;

        log::info!(
            "Activated {event_id} for user {user_id}: {} registered, {} failed",
            report.registered,
            report.failed
        );
        Ok(report)
    }

    /// Cancels every pending reminder of the event and removes its record.
    pub async fn deactivate(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<DeactivationReport, AlarmError> {
        self.event(event_id)?;

        let cancelled = self.discard(user_id, event_id).await;

        log::info!("Deactivated {event_id} for user {user_id}, {cancelled} reminders cancelled");
        Ok(DeactivationReport { cancelled })
    }

    /// Cancels the reminders of `event_id` and drops its record without
    /// looking the event up, for records whose event left the catalog.
    pub async fn discard(&self, user_id: &UserId, event_id: &EventId) -> usize {
        let cancelled = self.cancel_pending(event_id).await;
        self.update_state(user_id, |state| AlarmStateStore::remove(state, event_id))
            .await;
        cancelled
    }

    async fn register(
        &self,
        event: &Event,
        occurrence: &Occurrence,
        reminder_kind: ReminderKind,
    ) -> anyhow::Result<()> {
        let payload = ReminderPayload::for_occurrence(event, occurrence, reminder_kind);

        match reminder_kind {
            ReminderKind::Notification => {
                self.platform.schedule(occurrence.instant, payload).await?;
            }
            ReminderKind::PhoneAlarm => {
                self.phone_alarm.set_alarm(occurrence.instant, payload).await?;
            }
        }

        Ok(())
    }

    async fn cancel_pending(&self, event_id: &EventId) -> usize {
        let pending = match self.platform.list_pending().await {
            Ok(pending) => pending,
            Err(e) => {
                log::warn!("Could not list pending reminders. [event_id = {event_id}, error = {e:?}]");
                return 0;
            }
        };

        let mut cancelled = 0;
        for reminder in pending.iter().filter(|r| &r.payload.tag == event_id) {
            match self.platform.cancel(reminder.handle).await {
                Ok(()) => cancelled += 1,
                Err(e) => log::warn!("Could not cancel reminder {reminder}: {e:?}"),
            }
        }

        cancelled
    }

    async fn update_state(&self, user_id: &UserId, update: impl FnOnce(AlarmState) -> AlarmState) {
        // Populate the cache before taking the write lock.
        self.state(user_id).await;

        let updated = {
            let mut states = self.states.write().await;
            let current = states.remove(user_id).unwrap_or_default();
            let updated = update(current);
            states.insert(user_id.clone(), updated.clone());
            updated
        };

        // Saves run one at a time and always write the newest snapshot.
        let _saving = self.save_lock.lock().await;
        let latest = self
            .states
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or(updated);
        self.store.save(user_id, &latest).await;
    }
}
