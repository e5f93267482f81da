use std::sync::Arc;

use knightrehber_models::{
    alarm::{AlarmRecord, AlarmState},
    event::EventId,
    user::UserId,
};

use crate::{KeyValueStore, StorageError};

/// Loads and saves per-user alarm state through a key-value backend.
///
/// Persistence never fails the caller: unreadable data loads as an empty
/// state and write errors are logged, leaving the in-memory state as the
/// source of truth. Anonymous ids are never read from or written to the
/// backend.
#[derive(Clone)]
pub struct AlarmStateStore {
    backend: Arc<dyn KeyValueStore>,
}

impl AlarmStateStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn storage_key(user_id: &UserId) -> String {
        format!("alarms_{user_id}")
    }

    pub async fn load(&self, user_id: &UserId) -> AlarmState {
        if user_id.is_anonymous() {
            return AlarmState::new();
        }

        match self.try_load(user_id).await {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Could not load alarms, starting empty. [user_id = {user_id}, error = {e}]");
                AlarmState::new()
            }
        }
    }

    pub async fn save(&self, user_id: &UserId, state: &AlarmState) {
        if user_id.is_anonymous() {
            log::debug!("Skipping alarm persistence for anonymous user {user_id}");
            return;
        }

        if let Err(e) = self.try_save(user_id, state).await {
            log::error!("Could not save alarms. [user_id = {user_id}, error = {e}]");
        }
    }

    pub fn get<'a>(state: &'a AlarmState, event_id: &EventId) -> Option<&'a AlarmRecord> {
        state.get(event_id)
    }

    pub fn put(state: AlarmState, event_id: EventId, record: AlarmRecord) -> AlarmState {
        state.put(event_id, record)
    }

    pub fn remove(state: AlarmState, event_id: &EventId) -> AlarmState {
        state.remove(event_id)
    }

    async fn try_load(&self, user_id: &UserId) -> Result<AlarmState, StorageError> {
        let Some(contents) = self.backend.get(&Self::storage_key(user_id)).await? else {
            return Ok(AlarmState::new());
        };

        let state: AlarmState = serde_json::from_str(&contents)?;
        Ok(state.normalized())
    }

    async fn try_save(&self, user_id: &UserId, state: &AlarmState) -> Result<(), StorageError> {
        let contents = serde_json::to_string(state)?;
        self.backend.set(&Self::storage_key(user_id), contents).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use knightrehber_models::{
        alarm::ReminderKind,
        chrono::{TimeZone, Utc},
    };

    use super::*;
    use crate::InMemoryKeyValueStore;

    struct FailingKeyValueStore {
        writes: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for FailingKeyValueStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(anyhow::anyhow!("disk on fire").into())
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("disk on fire").into())
        }
    }

    fn sample_state() -> AlarmState {
        let scheduled_at = Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap();
        AlarmState::new()
            .put(EventId::new("bdw"), AlarmRecord::armed(ReminderKind::Notification, scheduled_at))
            .put(EventId::new("csw"), AlarmRecord::armed(ReminderKind::PhoneAlarm, scheduled_at))
    }

    #[tokio::test]
    async fn save_then_load_returns_same_state() {
        let store = AlarmStateStore::new(Arc::new(InMemoryKeyValueStore::new()));
        let user_id = UserId::new("1712");

        store.save(&user_id, &sample_state()).await;
        assert_eq!(store.load(&user_id).await, sample_state());

        store.save(&user_id, &AlarmState::new()).await;
        assert_eq!(store.load(&user_id).await, AlarmState::new());
    }

    #[tokio::test]
    async fn states_are_kept_per_user() {
        let store = AlarmStateStore::new(Arc::new(InMemoryKeyValueStore::new()));

        store.save(&UserId::new("a"), &sample_state()).await;

        assert!(store.load(&UserId::new("b")).await.is_empty());
    }

    #[tokio::test]
    async fn missing_or_corrupt_data_loads_empty() {
        let backend = Arc::new(InMemoryKeyValueStore::new());
        let store = AlarmStateStore::new(backend.clone());
        let user_id = UserId::new("1712");

        assert!(store.load(&user_id).await.is_empty());

        backend.set("alarms_1712", "not json".to_owned()).await.unwrap();
        assert!(store.load(&user_id).await.is_empty());
    }

    #[tokio::test]
    async fn guest_state_is_never_persisted() {
        let backend = Arc::new(InMemoryKeyValueStore::new());
        let store = AlarmStateStore::new(backend.clone());

        store.save(&UserId::guest(), &sample_state()).await;
        store.save(&UserId::new(""), &sample_state()).await;

        assert_eq!(backend.get("alarms_guest").await.unwrap(), None);
        assert_eq!(backend.get("alarms_").await.unwrap(), None);
        assert!(store.load(&UserId::guest()).await.is_empty());
    }

    #[tokio::test]
    async fn backend_failures_are_swallowed() {
        let backend = Arc::new(FailingKeyValueStore {
            writes: AtomicUsize::new(0),
        });
        let store = AlarmStateStore::new(backend.clone());
        let user_id = UserId::new("1712");

        store.save(&user_id, &sample_state()).await;

        assert_eq!(backend.writes.load(Ordering::SeqCst), 1);
        assert!(store.load(&user_id).await.is_empty());
    }

    #[test]
    fn record_helpers() {
        let state = sample_state();
        assert!(AlarmStateStore::get(&state, &EventId::new("bdw")).is_some());

        let state = AlarmStateStore::remove(state, &EventId::new("bdw"));
        assert!(AlarmStateStore::get(&state, &EventId::new("bdw")).is_none());

        let scheduled_at = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let state = AlarmStateStore::put(
            state,
            EventId::new("chaos"),
            AlarmRecord::armed(ReminderKind::Notification, scheduled_at),
        );
        assert_eq!(state.len(), 2);
        assert_eq!(AlarmStateStore::storage_key(&UserId::new("7")), "alarms_7");
    }
}
