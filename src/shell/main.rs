use axum::{ServiceExt, extract::Request};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use calc_history::modules::calculator::core::record_key::RandomSuffix;
use calc_history::shared::infrastructure::kv_store::etcd_gateway::EtcdGatewayStore;
use calc_history::shell::config::AppConfig;
use calc_history::shell::http::app;
use calc_history::shell::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        endpoints = ?config.store_endpoints,
        prefix = %config.key_prefix,
        "store configured"
    );

    let store = Arc::new(EtcdGatewayStore::new(
        config.store_endpoints.clone(),
        config.dial_timeout,
    ));
    let state = AppState::new(
        store,
        config.store_timeouts(),
        &config.key_prefix,
        Arc::new(RandomSuffix),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("calculator listening on http://{}/calc", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app(state))).await?;
    Ok(())
}
