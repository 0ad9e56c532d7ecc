use crate::modules::calculator::core::record_key::{SuffixSource, record_key};
use crate::shared::core::narration::Narration;
use crate::shared::infrastructure::kv_store::KvError;
use crate::shared::infrastructure::kv_store::connection::{StoreConnection, StoreConnector};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    pub key: String,
    pub value: String,
    pub revision: i64,
}

pub struct OperationRecorder {
    connector: StoreConnector,
    prefix: String,
    suffixes: Arc<dyn SuffixSource>,
}

impl OperationRecorder {
    pub fn new(
        connector: StoreConnector,
        prefix: impl Into<String>,
        suffixes: Arc<dyn SuffixSource>,
    ) -> Self {
        Self {
            connector,
            prefix: prefix.into(),
            suffixes,
        }
    }

    pub async fn record(
        &self,
        result: i64,
        out: &mut Narration,
    ) -> Result<OperationRecord, KvError> {
        let connection = self.connector.open(out).await?;
        let outcome = self.put(&connection, result, out).await;
        connection.release(out).await;
        outcome
    }

    async fn put(
        &self,
        connection: &StoreConnection,
        result: i64,
        out: &mut Narration,
    ) -> Result<OperationRecord, KvError> {
        let key = record_key(&self.prefix, self.suffixes.next_suffix());
        let value = result.to_string();
        out.line(format!("Key to ETCD: {key}"));
        out.line(format!("Value to ETCD: {value}"));

        match connection.put(&key, &value).await {
            Ok(put) => {
                tracing::info!(
                    key = %key,
                    value = %value,
                    revision = put.revision,
                    "operation recorded"
                );
                out.line(format!("Successfully PUT on ETCD: revision {}", put.revision));
                Ok(OperationRecord {
                    key,
                    value,
                    revision: put.revision,
                })
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "failed to record operation");
                out.line(format!("Error putting operation on ETCD: {err}"));
                Err(err)
            }
        }
    }
}
