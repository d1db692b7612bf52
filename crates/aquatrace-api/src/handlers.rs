//! API Handlers
//!
//! Reads run in a fresh transaction that is dropped afterwards. Writes go
//! through [`MemoryLedger::execute`] so a failed operation leaves nothing
//! behind.
use aquatrace_core::{
    ComplianceThresholds, ErrorKind, LedgerError, QualityAlert, QualityRecord, StationInfo,
    StoreError,
};
use aquatrace_ledger::{NewRecord, ALERT_EVENT};
use aquatrace_scoring::ScoreOutcome;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::middleware::caller_identity;
use crate::AppState;

/// Ledger error carried to the HTTP edge
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyExists => StatusCode::CONFLICT,
            ErrorKind::Deserialization => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Store if self.0.is_conflict() => StatusCode::CONFLICT,
            ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.0.kind().as_str(),
            "message": self.0.to_string(),
            "retryable": self.0.is_conflict(),
        }));
        (status, body).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn track_conflict(state: &AppState, err: LedgerError) -> ApiError {
    if let LedgerError::Store(StoreError::Conflict(detail)) = &err {
        state.metrics.commit_conflicts.inc();
        warn!(detail = %detail, "transaction rejected by concurrent commit");
    }
    ApiError(err)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    pub id: String,
    pub station_id: String,
    /// Measurement object with all 12 fields
    pub parameters: Value,
    pub certifier_id: String,
    pub certifier_org: String,
    #[serde(default)]
    pub ipfs_hash: String,
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": aquatrace_core::AQUATRACE_VERSION })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

pub async fn initialize(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let contract = &state.contract;
    state
        .ledger
        .execute(caller_identity(&headers), |tx| contract.initialize(tx))
        .map_err(|e| track_conflict(&state, e))?;
    Ok(StatusCode::CREATED)
}

pub async fn create_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRecordRequest>,
) -> ApiResult<(StatusCode, Json<QualityRecord>)> {
    let input = NewRecord::new(req.id, req.station_id, req.parameters.to_string())
        .certified_by(req.certifier_id, req.certifier_org)
        .with_ipfs_hash(req.ipfs_hash);

    let contract = &state.contract;
    let committed = state
        .ledger
        .execute(caller_identity(&headers), |tx| {
            contract.create_quality_record(tx, input)
        })
        .map_err(|e| track_conflict(&state, e))?;

    state.metrics.records_created.inc();
    if committed.events.iter().any(|event| event.name == ALERT_EVENT) {
        state.metrics.alerts_raised.inc();
    }
    Ok((StatusCode::CREATED, Json(committed.value)))
}

pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(parameters): Json<Value>,
) -> ApiResult<Json<ScoreOutcome>> {
    let tx = state.ledger.begin(caller_identity(&headers));
    Ok(Json(state.contract.analyze_quality(&tx, &parameters.to_string())?))
}

pub async fn get_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<QualityRecord>> {
    let tx = state.ledger.begin(caller_identity(&headers));
    Ok(Json(state.contract.get_quality_record(&tx, &id)?))
}

pub async fn record_exists(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let tx = state.ledger.begin(caller_identity(&headers));
    let exists = state.contract.record_exists(&tx, &id)?;
    Ok(Json(json!({ "id": id, "exists": exists })))
}

pub async fn list_records(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<QualityRecord>>> {
    let tx = state.ledger.begin(caller_identity(&headers));
    Ok(Json(state.contract.get_all_records(&tx)?))
}

pub async fn register_station(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(station): Json<StationInfo>,
) -> ApiResult<(StatusCode, Json<StationInfo>)> {
    let contract = &state.contract;
    let committed = state
        .ledger
        .execute(caller_identity(&headers), |tx| contract.register_station(tx, station))
        .map_err(|e| track_conflict(&state, e))?;
    Ok((StatusCode::CREATED, Json(committed.value)))
}

pub async fn get_station(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<StationInfo>> {
    let tx = state.ledger.begin(caller_identity(&headers));
    Ok(Json(state.contract.get_station(&tx, &id)?))
}

pub async fn station_exists(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let tx = state.ledger.begin(caller_identity(&headers));
    let exists = state.contract.station_exists(&tx, &id)?;
    Ok(Json(json!({ "id": id, "exists": exists })))
}

pub async fn station_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<QualityRecord>>> {
    let tx = state.ledger.begin(caller_identity(&headers));
    Ok(Json(state.contract.get_station_records(&tx, &id)?))
}

pub async fn station_alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<QualityAlert>>> {
    let tx = state.ledger.begin(caller_identity(&headers));
    Ok(Json(state.contract.get_station_alerts(&tx, &id)?))
}

pub async fn verify_chain(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let tx = state.ledger.begin(caller_identity(&headers));
    let report = state.contract.verify_station_chain(&tx, &id)?;
    Ok(Json(json!({ "intact": report.is_intact(), "report": report })))
}

pub async fn publish_thresholds(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(document): Json<ComplianceThresholds>,
) -> ApiResult<StatusCode> {
    let contract = &state.contract;
    state
        .ledger
        .execute(caller_identity(&headers), |tx| contract.publish_thresholds(tx, document))
        .map_err(|e| track_conflict(&state, e))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_thresholds(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(regulation): Path<String>,
) -> ApiResult<Json<ComplianceThresholds>> {
    let tx = state.ledger.begin(caller_identity(&headers));
    Ok(Json(state.contract.get_thresholds(&tx, &regulation)?))
}
