// In memory implementation of the KvStore port.
//
// Purpose
// - Support handler tests and local development without an etcd cluster.
//
// Responsibilities
// - Keep keys ordered so prefix listings come back sorted like etcd's.
// - Let tests inject faults (offline store, failing close/put/delete, slow calls)
//   and count the calls a handler made.

use crate::shared::infrastructure::kv_store::{
    KeyOrder, KeyValue, KvError, KvSession, KvStore, PutOutcome,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

#[derive(Default)]
struct Shared {
    entries: RwLock<BTreeMap<String, String>>,
    revision: AtomicI64,
    is_offline: AtomicBool,
    is_close_failing: AtomicBool,
    is_put_failing: AtomicBool,
    failing_deletes: Mutex<HashSet<String>>,
    connect_delay_ms: AtomicU64,
    operation_delay_ms: AtomicU64,
    connect_calls: AtomicUsize,
    put_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct InMemoryKvStore {
    shared: Arc<Shared>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&self) {
        self.shared.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn toggle_failing_close(&self) {
        self.shared.is_close_failing.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn toggle_failing_put(&self) {
        self.shared.is_put_failing.fetch_xor(true, Ordering::SeqCst);
    }

    pub async fn fail_delete_of(&self, key: impl Into<String>) {
        self.shared.failing_deletes.lock().await.insert(key.into());
    }

    pub fn set_connect_delay_ms(&self, ms: u64) {
        self.shared.connect_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn set_operation_delay_ms(&self, ms: u64) {
        self.shared.operation_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub async fn seed(&self, key: impl Into<String>, value: impl Into<String>) {
        self.shared
            .entries
            .write()
            .await
            .insert(key.into(), value.into());
        self.shared.revision.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.shared.entries.read().await.clone()
    }

    pub fn connect_calls(&self) -> usize {
        self.shared.connect_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.shared.put_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.shared.delete_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.shared.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn connect(&self) -> Result<Box<dyn KvSession>, KvError> {
        self.shared.connect_calls.fetch_add(1, Ordering::SeqCst);
        pause(&self.shared.connect_delay_ms).await;
        if self.shared.is_offline.load(Ordering::SeqCst) {
            return Err(KvError::Connect("in-memory store offline".into()));
        }
        Ok(Box::new(InMemorySession {
            shared: self.shared.clone(),
        }))
    }
}

struct InMemorySession {
    shared: Arc<Shared>,
}

async fn pause(delay_ms: &AtomicU64) {
    let ms = delay_ms.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[async_trait]
impl KvSession for InMemorySession {
    async fn get_prefix(&self, prefix: &str, order: KeyOrder) -> Result<Vec<KeyValue>, KvError> {
        pause(&self.shared.operation_delay_ms).await;
        let guard = self.shared.entries.read().await;
        let mut entries: Vec<KeyValue> = guard
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        if order == KeyOrder::Descending {
            entries.reverse();
        }
        Ok(entries)
    }

    async fn put(&self, key: &str, value: &str) -> Result<PutOutcome, KvError> {
        self.shared.put_calls.fetch_add(1, Ordering::SeqCst);
        pause(&self.shared.operation_delay_ms).await;
        if self.shared.is_put_failing.load(Ordering::SeqCst) {
            return Err(KvError::Backend("put rejected".into()));
        }
        let mut guard = self.shared.entries.write().await;
        guard.insert(key.to_string(), value.to_string());
        let revision = self.shared.revision.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PutOutcome { revision })
    }

    async fn delete(&self, key: &str) -> Result<u64, KvError> {
        self.shared.delete_calls.fetch_add(1, Ordering::SeqCst);
        pause(&self.shared.operation_delay_ms).await;
        if self.shared.failing_deletes.lock().await.contains(key) {
            return Err(KvError::Backend(format!("delete of {key} rejected")));
        }
        let removed = self.shared.entries.write().await.remove(key);
        if removed.is_some() {
            self.shared.revision.fetch_add(1, Ordering::SeqCst);
        }
        Ok(u64::from(removed.is_some()))
    }

    async fn close(&self) -> Result<(), KvError> {
        self.shared.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.shared.is_close_failing.load(Ordering::SeqCst) {
            return Err(KvError::Close("in-memory session already closed".into()));
        }
        Ok(())
    }
}
