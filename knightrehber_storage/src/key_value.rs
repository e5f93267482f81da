use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::StorageError;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

#[derive(Default)]
pub struct InMemoryKeyValueStore {
    store: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let store = self.store.read().await;
        Ok(store.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut store = self.store.write().await;
        store.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Keeps every key in its own `<key>.json` file inside one directory.
pub struct JsonFileKeyValueStore {
    dir: PathBuf,
}

impl JsonFileKeyValueStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_name_for(key)))
    }
}

/// Keeps `[A-Za-z0-9_-]` and writes every other byte as `%xx`, so distinct
/// keys never share a file.
fn file_name_for(key: &str) -> String {
    let mut file_name = String::with_capacity(key.len());
    for c in key.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            file_name.push(c);
            continue;
        }

        let mut buf = [0u8; 4];
        for byte in c.encode_utf8(&mut buf).bytes() {
            file_name.push('%');
            file_name.push_str(&hex::encode([byte]));
        }
    }

    file_name
}

#[async_trait]
impl KeyValueStore for JsonFileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, value).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store() {
        let store = InMemoryKeyValueStore::new();

        assert_eq!(store.get("alarms_1").await.unwrap(), None);

        store.set("alarms_1", "{}".to_owned()).await.unwrap();
        assert_eq!(store.get("alarms_1").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileKeyValueStore::new(dir.path().join("data"));

        assert_eq!(store.get("alarms_42").await.unwrap(), None);

        store.set("alarms_42", r#"{"a":1}"#.to_owned()).await.unwrap();
        assert!(dir.path().join("data").join("alarms_42.json").exists());
        assert_eq!(store.get("alarms_42").await.unwrap().as_deref(), Some(r#"{"a":1}"#));

        store.set("alarms_42", "{}".to_owned()).await.unwrap();
        assert_eq!(store.get("alarms_42").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn file_names_are_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileKeyValueStore::new(dir.path());

        store.set("alarms_../user@mail", "{}".to_owned()).await.unwrap();

        assert!(dir.path().join("alarms_%2e%2e%2fuser%40mail.json").exists());
    }

    #[tokio::test]
    async fn similar_keys_do_not_share_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileKeyValueStore::new(dir.path());

        store.set("alarms_ali@ko", r#"{"csw":1}"#.to_owned()).await.unwrap();
        assert_eq!(store.get("alarms_ali_ko").await.unwrap(), None);
        assert_eq!(store.get("alarms_ali%40ko").await.unwrap(), None);

        store.set("alarms_ali_ko", r#"{"bdw":1}"#.to_owned()).await.unwrap();
        assert_eq!(store.get("alarms_ali@ko").await.unwrap().as_deref(), Some(r#"{"csw":1}"#));
        assert_eq!(store.get("alarms_ali_ko").await.unwrap().as_deref(), Some(r#"{"bdw":1}"#));
    }

    #[test]
    fn non_ascii_ids_are_escaped_per_byte() {
        assert_eq!(file_name_for("alarms_şeyma"), "alarms_%c5%9feyma");
        assert_eq!(file_name_for("alarms_1712"), "alarms_1712");
    }
}
