mod alarm_state_store;
mod error;
mod key_value;

pub use alarm_state_store::AlarmStateStore;
pub use error::StorageError;
pub use key_value::{InMemoryKeyValueStore, JsonFileKeyValueStore, KeyValueStore};
