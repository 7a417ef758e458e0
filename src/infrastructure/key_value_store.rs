use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const DAILY_TASKS_KEY: &str = "dailyTasks";
pub const WEEKLY_TASKS_KEY: &str = "weeklyTasks";
pub const MEDIA_TASKS_KEY: &str = "mediaTasks";
pub const CUSTOM_TASKS_KEY: &str = "customTasks";
pub const COMPLETED_TASKS_KEY: &str = "completedTasksByDay";
pub const REMINDERS_KEY: &str = "reminders";
pub const THEME_KEY: &str = "theme";

/// String-keyed store holding one full JSON snapshot per key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, InfraError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), InfraError>;
    async fn remove(&self, key: &str) -> Result<(), InfraError>;
}

#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    db_path: PathBuf,
}

impl SqliteKeyValueStore {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    async fn with_connection<T, F>(&self, operation: F) -> Result<T, InfraError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, InfraError> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let connection = Connection::open(&db_path)?;
            operation(&connection)
        })
        .await?
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, InfraError> {
        let key = key.to_string();
        self.with_connection(move |connection| {
            let value = connection
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), InfraError> {
        let key = key.to_string();
        let value = value.to_string();
        self.with_connection(move |connection| {
            connection.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), InfraError> {
        let key = key.to_string();
        self.with_connection(move |connection| {
            connection.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }
}

#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, InfraError> {
        self.values
            .lock()
            .map_err(|error| InfraError::StatePoisoned(format!("key-value store: {error}")))
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, InfraError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), InfraError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), InfraError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::initialize_database;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_DB: AtomicUsize = AtomicUsize::new(0);

    struct TempDatabase {
        path: PathBuf,
    }

    impl TempDatabase {
        fn new() -> Self {
            let sequence = NEXT_TEMP_DB.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "dayboard-kv-tests-{}-{}.sqlite",
                std::process::id(),
                sequence
            ));
            initialize_database(&path).expect("initialize database");
            Self { path }
        }
    }

    impl Drop for TempDatabase {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    #[tokio::test]
    async fn sqlite_store_set_get_remove() {
        let database = TempDatabase::new();
        let store = SqliteKeyValueStore::new(&database.path);

        assert_eq!(store.get(REMINDERS_KEY).await.expect("get missing"), None);
        store.set(REMINDERS_KEY, "[]").await.expect("set");
        store
            .set(REMINDERS_KEY, r#"[{"id":"r1","text":"Milk","completed":false}]"#)
            .await
            .expect("overwrite");
        assert_eq!(
            store.get(REMINDERS_KEY).await.expect("get"),
            Some(r#"[{"id":"r1","text":"Milk","completed":false}]"#.to_string())
        );

        store.remove(REMINDERS_KEY).await.expect("remove");
        assert_eq!(store.get(REMINDERS_KEY).await.expect("get removed"), None);
    }

    #[tokio::test]
    async fn sqlite_store_fails_without_schema() {
        let path = std::env::temp_dir().join(format!(
            "dayboard-kv-noschema-{}-{}.sqlite",
            std::process::id(),
            NEXT_TEMP_DB.fetch_add(1, Ordering::Relaxed)
        ));
        let store = SqliteKeyValueStore::new(&path);
        let result = store.set(THEME_KEY, "\"dark\"").await;
        assert!(matches!(result, Err(InfraError::Sqlite(_))));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn in_memory_store_seeds_entries() {
        let store = InMemoryKeyValueStore::with_entries([(THEME_KEY, "light")]);
        assert_eq!(store.get(THEME_KEY).await.expect("get"), Some("light".to_string()));
        store.remove(THEME_KEY).await.expect("remove");
        assert_eq!(store.get(THEME_KEY).await.expect("get"), None);
    }
}
