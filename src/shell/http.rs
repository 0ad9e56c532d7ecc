use axum::{Router, routing::any};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use crate::modules::calculator::use_cases::compute::inbound::http as compute_http;
use crate::modules::calculator::use_cases::list_history::inbound::http as history_http;
use crate::modules::calculator::use_cases::purge_history::inbound::http as purge_http;
use crate::shell::state::AppState;

/// Every route answers any method.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/calc/sum/{val_a}/{val_b}", any(compute_http::sum))
        .route("/calc/subtract/{val_a}/{val_b}", any(compute_http::subtract))
        .route("/calc/multiply/{val_a}/{val_b}", any(compute_http::multiply))
        .route("/calc/divide/{val_a}/{val_b}", any(compute_http::divide))
        .route("/calc/history", any(history_http::handle))
        .route("/calc/deleteAllUserData", any(purge_http::handle))
        .with_state(state)
}

/// The served application: traced routes behind trailing-slash trimming.
pub fn app(state: AppState) -> NormalizePath<Router> {
    // Trimming has to happen before routing, so the layer wraps the router.
    NormalizePathLayer::trim_trailing_slash().layer(router(state).layer(TraceLayer::new_for_http()))
}
