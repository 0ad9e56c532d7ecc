use crate::modules::calculator::core::record_key::SuffixSource;
use crate::modules::calculator::use_cases::compute::handler::ComputeHandler;
use crate::modules::calculator::use_cases::list_history::handler::ListHistoryHandler;
use crate::modules::calculator::use_cases::purge_history::handler::PurgeHistoryHandler;
use crate::modules::calculator::use_cases::record_operation::handler::OperationRecorder;
use crate::shared::infrastructure::kv_store::KvStore;
use crate::shared::infrastructure::kv_store::connection::{StoreConnector, StoreTimeouts};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub compute: Arc<ComputeHandler>,
    pub history: Arc<ListHistoryHandler>,
    pub purge: Arc<PurgeHistoryHandler>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KvStore>,
        timeouts: StoreTimeouts,
        key_prefix: &str,
        suffixes: Arc<dyn SuffixSource>,
    ) -> Self {
        let connector = StoreConnector::new(store, timeouts);
        let recorder = Arc::new(OperationRecorder::new(connector.clone(), key_prefix, suffixes));
        Self {
            compute: Arc::new(ComputeHandler::new(recorder)),
            history: Arc::new(ListHistoryHandler::new(connector.clone(), key_prefix)),
            purge: Arc::new(PurgeHistoryHandler::new(connector, key_prefix)),
        }
    }
}
