use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("{0}")]
    Connect(String),

    #[error("store operation timed out")]
    Timeout,

    #[error("store operation canceled")]
    Canceled,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("close failed: {0}")]
    Close(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutOutcome {
    pub revision: i64,
}

/// Dials the store. Every call yields a fresh session; nothing is pooled.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn KvSession>, KvError>;
}

#[async_trait]
pub trait KvSession: Send + Sync {
    /// All entries whose key starts with `prefix`, sorted by key.
    async fn get_prefix(&self, prefix: &str, order: KeyOrder) -> Result<Vec<KeyValue>, KvError>;
    async fn put(&self, key: &str, value: &str) -> Result<PutOutcome, KvError>;
    /// Returns how many keys were removed.
    async fn delete(&self, key: &str) -> Result<u64, KvError>;
    async fn close(&self) -> Result<(), KvError>;
}

pub mod connection;
pub mod etcd_gateway;
pub mod in_memory;
