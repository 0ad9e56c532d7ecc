use crate::modules::calculator::core::record_key::record_prefix;
use crate::shared::core::narration::Narration;
use crate::shared::infrastructure::kv_store::connection::{StoreConnection, StoreConnector};
use crate::shared::infrastructure::kv_store::{KeyOrder, KeyValue, KvError};

pub struct ListHistoryHandler {
    connector: StoreConnector,
    prefix: String,
}

impl ListHistoryHandler {
    pub fn new(connector: StoreConnector, prefix: impl Into<String>) -> Self {
        Self {
            connector,
            prefix: prefix.into(),
        }
    }

    pub async fn handle(&self, out: &mut Narration) -> Result<Vec<KeyValue>, KvError> {
        let connection = self.connector.open(out).await?;
        let outcome = self.render(&connection, out).await;
        connection.release(out).await;
        outcome
    }

    async fn render(
        &self,
        connection: &StoreConnection,
        out: &mut Narration,
    ) -> Result<Vec<KeyValue>, KvError> {
        let records = list_records(connection, &self.prefix, out).await?;
        for record in &records {
            out.line(format!("Stored key / value: {} = {}", record.key, record.value));
        }
        Ok(records)
    }
}

/// Records under `prefix`, ascending by key. Shared with the purge flow.
pub(crate) async fn list_records(
    connection: &StoreConnection,
    prefix: &str,
    out: &mut Narration,
) -> Result<Vec<KeyValue>, KvError> {
    connection
        .get_prefix(&record_prefix(prefix), KeyOrder::Ascending)
        .await
        .inspect_err(|err| {
            tracing::warn!(error = %err, "failed to list operations");
            out.line("Error listing operations");
        })
}
