// Per-request store connection.
//
// A connection is opened for one request and released before the response is
// sent. Dialing is bounded by the dial timeout; every call made on an open
// connection shares a single deadline that starts when the connection opens.
// Releasing cancels the scope first and then closes the session. Dropping a
// connection without releasing it (panic, forgotten release) still cancels.

use crate::shared::core::narration::Narration;
use crate::shared::infrastructure::kv_store::{
    KeyOrder, KeyValue, KvError, KvSession, KvStore, PutOutcome,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    pub dial: Duration,
    pub operation: Duration,
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self {
            dial: Duration::from_secs(5),
            operation: Duration::from_secs(10),
        }
    }
}

pub struct OperationScope {
    deadline: Instant,
    cancel: CancellationToken,
}

impl OperationScope {
    pub fn new(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[cfg(test)]
    fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn run<T, F>(&self, operation: F) -> Result<T, KvError>
    where
        F: Future<Output = Result<T, KvError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(KvError::Canceled),
            outcome = tokio::time::timeout_at(self.deadline, operation) => {
                outcome.unwrap_or(Err(KvError::Timeout))
            }
        }
    }
}

impl Drop for OperationScope {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[derive(Clone)]
pub struct StoreConnector {
    store: Arc<dyn KvStore>,
    timeouts: StoreTimeouts,
}

impl StoreConnector {
    pub fn new(store: Arc<dyn KvStore>, timeouts: StoreTimeouts) -> Self {
        Self { store, timeouts }
    }

    pub async fn open(&self, out: &mut Narration) -> Result<StoreConnection, KvError> {
        let dialed = tokio::time::timeout(self.timeouts.dial, self.store.connect())
            .await
            .unwrap_or_else(|_| {
                Err(KvError::Connect(format!(
                    "dial timed out after {:?}",
                    self.timeouts.dial
                )))
            });
        match dialed {
            Ok(session) => {
                tracing::debug!("store connection opened");
                out.line("ETCD Client connected");
                Ok(StoreConnection {
                    session,
                    scope: OperationScope::new(self.timeouts.operation),
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "store connection failed");
                out.line(format!("Error starting connection with ETCD: {err}"));
                out.line("Error opening ETCD connection");
                Err(err)
            }
        }
    }
}

pub struct StoreConnection {
    session: Box<dyn KvSession>,
    scope: OperationScope,
}

impl StoreConnection {
    pub async fn get_prefix(
        &self,
        prefix: &str,
        order: KeyOrder,
    ) -> Result<Vec<KeyValue>, KvError> {
        self.scope.run(self.session.get_prefix(prefix, order)).await
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<PutOutcome, KvError> {
        self.scope.run(self.session.put(key, value)).await
    }

    pub async fn delete(&self, key: &str) -> Result<u64, KvError> {
        self.scope.run(self.session.delete(key)).await
    }

    /// Cancels in-flight work, then closes the session. A close failure is
    /// narrated and otherwise ignored.
    pub async fn release(self, out: &mut Narration) {
        self.scope.cancel();
        match self.session.close().await {
            Ok(()) => {
                tracing::debug!("store connection closed");
                out.line("ETCD Client disconnected");
            }
            Err(err) => {
                tracing::warn!(error = %err, "store connection close failed");
                out.line("Error closing ETCD client");
            }
        }
    }
}
