use crate::modules::calculator::use_cases::list_history::handler::list_records;
use crate::shared::core::narration::Narration;
use crate::shared::infrastructure::kv_store::KvError;
use crate::shared::infrastructure::kv_store::connection::{StoreConnection, StoreConnector};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

pub struct PurgeHistoryHandler {
    connector: StoreConnector,
    prefix: String,
}

impl PurgeHistoryHandler {
    pub fn new(connector: StoreConnector, prefix: impl Into<String>) -> Self {
        Self {
            connector,
            prefix: prefix.into(),
        }
    }

    pub async fn handle(&self, out: &mut Narration) -> Result<PurgeReport, KvError> {
        let connection = self.connector.open(out).await?;
        let outcome = self.purge(&connection, out).await;
        connection.release(out).await;
        outcome
    }

    /// Deletes one key at a time in ascending order. A failed delete is
    /// reported and the remaining keys are still attempted.
    async fn purge(
        &self,
        connection: &StoreConnection,
        out: &mut Narration,
    ) -> Result<PurgeReport, KvError> {
        let records = list_records(connection, &self.prefix, out).await?;
        if records.is_empty() {
            out.line("Nothing to delete here");
            return Ok(PurgeReport::default());
        }

        let mut report = PurgeReport::default();
        for record in records {
            match connection.delete(&record.key).await {
                Ok(_) => {
                    out.line(format!("Key deleted successfully: {}", record.key));
                    report.deleted.push(record.key);
                }
                Err(err) => {
                    tracing::warn!(key = %record.key, error = %err, "failed to delete operation");
                    out.line(format!("Error deleting key {}: {err}", record.key));
                    report.failed.push(record.key);
                }
            }
        }
        tracing::info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "history purged"
        );
        Ok(report)
    }
}
