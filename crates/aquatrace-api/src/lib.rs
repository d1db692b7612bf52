//! Aquatrace API /v1: REST host for the quality ledger
pub mod handlers;
pub mod metrics;
pub mod middleware;

use std::sync::Arc;

use aquatrace_core::MemoryLedger;
use aquatrace_ledger::QualityContract;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::metrics::Metrics;

/// Shared handler state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub ledger: MemoryLedger,
    pub contract: Arc<QualityContract>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(ledger: MemoryLedger, contract: QualityContract, metrics: Metrics) -> Self {
        Self {
            ledger,
            contract: Arc::new(contract),
            metrics: Arc::new(metrics),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/v1/initialize", post(handlers::initialize))
        .route("/v1/analyze", post(handlers::analyze))
        .route(
            "/v1/records",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route("/v1/records/{id}", get(handlers::get_record))
        .route("/v1/records/{id}/exists", get(handlers::record_exists))
        .route("/v1/stations", post(handlers::register_station))
        .route("/v1/stations/{id}", get(handlers::get_station))
        .route("/v1/stations/{id}/exists", get(handlers::station_exists))
        .route("/v1/stations/{id}/records", get(handlers::station_records))
        .route("/v1/stations/{id}/alerts", get(handlers::station_alerts))
        .route("/v1/stations/{id}/chain", get(handlers::verify_chain))
        .route("/v1/thresholds", post(handlers::publish_thresholds))
        .route("/v1/thresholds/{regulation}", get(handlers::get_thresholds))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: &str, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("aquatrace API listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
