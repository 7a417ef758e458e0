use crate::infrastructure::key_value_store::KeyValueStore;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default)]
pub struct Advisory {
    message: Arc<Mutex<Option<String>>>,
}

impl Advisory {
    fn slot(&self) -> Option<MutexGuard<'_, Option<String>>> {
        match self.message.lock() {
            Ok(slot) => Some(slot),
            Err(error) => {
                tracing::error!(error = %error, "advisory lock poisoned");
                None
            }
        }
    }

    pub fn report(&self, message: impl Into<String>) {
        if let Some(mut slot) = self.slot() {
            *slot = Some(message.into());
        }
    }

    pub fn current(&self) -> Option<String> {
        self.slot().and_then(|slot| slot.clone())
    }

    pub fn dismiss(&self) {
        if let Some(mut slot) = self.slot() {
            *slot = None;
        }
    }
}

pub fn save_failure_message(key: &str) -> String {
    format!("Error saving your {key}. Changes may not persist if you close the app.")
}

enum PersistCommand {
    Write { key: &'static str, value: String },
    Flush(oneshot::Sender<()>),
}

/// Write-behind queue. Snapshots are applied to the store one at a time in
/// the order they were enqueued; a failed write is reported and dropped.
#[derive(Debug, Clone)]
pub struct PersistenceQueue {
    sender: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistenceQueue {
    pub fn spawn(store: Arc<dyn KeyValueStore>, advisory: Advisory) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(store, advisory, receiver));
        (Self { sender }, handle)
    }

    pub fn enqueue(&self, key: &'static str, value: String) {
        if self.sender.send(PersistCommand::Write { key, value }).is_err() {
            tracing::error!(key, "persistence worker stopped; dropping snapshot");
        }
    }

    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(PersistCommand::Flush(done)).is_err() {
            return;
        }
        let _ = wait.await;
    }
}

async fn run_worker(
    store: Arc<dyn KeyValueStore>,
    advisory: Advisory,
    mut receiver: mpsc::UnboundedReceiver<PersistCommand>,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            PersistCommand::Write { key, value } => {
                if let Err(error) = store.set(key, &value).await {
                    tracing::error!(key, error = %error, "failed to save collection");
                    advisory.report(save_failure_message(key));
                } else {
                    tracing::debug!(key, bytes = value.len(), "saved collection");
                }
            }
            PersistCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::error::InfraError;
    use crate::infrastructure::key_value_store::{InMemoryKeyValueStore, REMINDERS_KEY, THEME_KEY};
    use async_trait::async_trait;

    #[derive(Debug, Default)]
    struct ReadOnlyStore;

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, InfraError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), InfraError> {
            Err(InfraError::Storage("disk full".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<(), InfraError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn writes_land_in_enqueue_order() {
        let store = Arc::new(InMemoryKeyValueStore::default());
        let (queue, _handle) = PersistenceQueue::spawn(store.clone(), Advisory::default());

        for index in 0..50 {
            queue.enqueue(REMINDERS_KEY, format!("[{index}]"));
        }
        queue.flush().await;

        assert_eq!(
            store.get(REMINDERS_KEY).await.expect("read back"),
            Some("[49]".to_string())
        );
    }

    #[tokio::test]
    async fn failed_write_reports_advisory_and_keeps_running() {
        let advisory = Advisory::default();
        let (queue, _handle) = PersistenceQueue::spawn(Arc::new(ReadOnlyStore), advisory.clone());

        queue.enqueue(THEME_KEY, "\"light\"".to_string());
        queue.flush().await;
        assert_eq!(advisory.current(), Some(save_failure_message(THEME_KEY)));

        advisory.dismiss();
        queue.flush().await;
        assert_eq!(advisory.current(), None);
    }

    #[test]
    fn poisoned_advisory_degrades_to_empty() {
        let advisory = Advisory::default();
        advisory.report("first");
        let shared = advisory.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.message.lock().expect("advisory lock");
            panic!("poison the advisory");
        })
        .join();

        advisory.report("second");
        advisory.dismiss();
        assert_eq!(advisory.current(), None);
    }
}
