use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use knightrehber_models::{
    catalog::EventCatalog,
    event::Event,
    reminder::{PendingReminder, PermissionStatus, ReminderHandle, ReminderPayload},
};
use knightrehber_storage::{AlarmStateStore, InMemoryKeyValueStore, KeyValueStore, StorageError};

use crate::{PhoneAlarm, PlatformReminderService};

pub type CallMarker = Arc<Mutex<Vec<ReminderHandle>>>;

/// Platform fake keeping pending reminders in memory.
pub struct RecordingPlatform {
    pub pending: Mutex<Vec<PendingReminder>>,
    pub cancelled: CallMarker,
    pub schedule_calls: AtomicUsize,
    pub permission_requests: AtomicUsize,
    failing_calls: HashSet<usize>,
    permission: Mutex<PermissionStatus>,
    answer: PermissionStatus,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            cancelled: Arc::new(Mutex::new(Vec::new())),
            schedule_calls: AtomicUsize::new(0),
            permission_requests: AtomicUsize::new(0),
            failing_calls: HashSet::new(),
            permission: Mutex::new(PermissionStatus::Granted),
            answer: PermissionStatus::Granted,
        }
    }

    /// Fails the given zero-based `schedule` calls.
    pub fn failing_on(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.failing_calls = calls.into_iter().collect();
        self
    }

    pub fn with_permission(self, status: PermissionStatus, answer: PermissionStatus) -> Self {
        *self.permission.lock().unwrap() = status;
        Self { answer, ..self }
    }

    pub fn pending(&self) -> Vec<PendingReminder> {
        self.pending.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformReminderService for RecordingPlatform {
    async fn schedule(
        &self,
        trigger_at: DateTime<Utc>,
        payload: ReminderPayload,
    ) -> anyhow::Result<ReminderHandle> {
        let call = self.schedule_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_calls.contains(&call) {
            anyhow::bail!("registration {call} rejected");
        }

        let handle = call as ReminderHandle + 1;
        self.pending.lock().unwrap().push(PendingReminder {
            handle,
            trigger_at,
            payload,
        });
        Ok(handle)
    }

    async fn cancel(&self, handle: ReminderHandle) -> anyhow::Result<()> {
        self.cancelled.lock().unwrap().push(handle);
        self.pending.lock().unwrap().retain(|r| r.handle != handle);
        Ok(())
    }

    async fn list_pending(&self) -> anyhow::Result<Vec<PendingReminder>> {
        Ok(self.pending())
    }

    async fn permission_status(&self) -> PermissionStatus {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> PermissionStatus {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        let mut permission = self.permission.lock().unwrap();
        *permission = self.answer;
        *permission
    }
}

#[derive(Default)]
pub struct RecordingPhoneAlarm {
    pub alarms: Mutex<Vec<(DateTime<Utc>, ReminderPayload)>>,
}

#[async_trait]
impl PhoneAlarm for RecordingPhoneAlarm {
    async fn set_alarm(&self, trigger_at: DateTime<Utc>, payload: ReminderPayload) -> anyhow::Result<()> {
        self.alarms.lock().unwrap().push((trigger_at, payload));
        Ok(())
    }
}

/// In-memory key-value store counting writes.
#[derive(Default)]
pub struct CountingKeyValueStore {
    inner: InMemoryKeyValueStore,
    pub writes: AtomicUsize,
    pub fail_writes: bool,
    first_write_delay: Option<Duration>,
}

impl CountingKeyValueStore {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Holds the first write back for `delay` before storing it.
    pub fn slow_first_write(delay: Duration) -> Self {
        Self {
            first_write_delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn stored(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for CountingKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let write = self.writes.fetch_add(1, Ordering::SeqCst);
        if let (0, Some(delay)) = (write, self.first_write_delay) {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes {
            return Err(anyhow::anyhow!("read-only filesystem").into());
        }
        self.inner.set(key, value).await
    }
}

pub fn store(backend: Arc<CountingKeyValueStore>) -> AlarmStateStore {
    AlarmStateStore::new(backend)
}

/// Event list used across the scheduler tests; `csw` only runs on Sundays.
pub fn catalog() -> Arc<EventCatalog> {
    let events = vec![
        Event::parse("bdw", "Border Defence War", &["13:00", "19:00", "02:00"], None).unwrap(),
        Event::parse("chaos", "Chaos", &["10:00"], None).unwrap(),
        Event::parse("csw", "Castle Siege War", &["20:30"], Some(&["Pazar"])).unwrap(),
    ];
    Arc::new(EventCatalog::new(events).unwrap())
}

/// Monday 2025-06-02 01:00 UTC.
pub fn monday_night() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 1, 0, 0).unwrap()
}
