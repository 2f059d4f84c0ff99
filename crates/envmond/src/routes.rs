//! API routes for envmond
//!
//! Series endpoints never fail because the store is down: the resolver
//! substitutes a synthetic series with the same shape.

use crate::error::ApiError;
use crate::server::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use envmon_common::threshold::{self, SeriesSummary};
use envmon_common::{
    DataPoint, MetricCatalog, MetricCatalogEntry, MetricType, ReadingPayload, ResolvedSeries,
    SeriesRequest, StoreError, TimeFrame,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

type AppStateArc = Arc<AppState>;

/// Debug-only header naming where a series came from
pub const PROVENANCE_HEADER: &str = "x-envmon-provenance";

// ============================================================================
// Data Routes
// ============================================================================

pub fn data_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/data", post(ingest_reading))
        .route("/api/data/:metric", get(get_series))
        .route("/api/data/:metric/annotated", get(get_annotated))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesParams {
    pub time_frame: Option<String>,
    pub threshold: Option<f64>,
}

async fn resolve_series(
    state: &AppStateArc,
    metric: &str,
    params: &SeriesParams,
) -> Result<ResolvedSeries, ApiError> {
    let request = SeriesRequest::from_params(metric, params.time_frame.as_deref(), params.threshold)?;
    let resolver = state.resolver.clone();

    // Store reads block; keep them off the runtime threads
    let resolved = tokio::task::spawn_blocking(move || {
        resolver.resolve(&request, Utc::now(), &mut rand::thread_rng())
    })
    .await??;

    Ok(resolved)
}

fn tag_provenance(state: &AppState, resolved: &ResolvedSeries, response: &mut Response) {
    if state.debug_mode {
        response.headers_mut().insert(
            PROVENANCE_HEADER,
            HeaderValue::from_static(resolved.provenance.as_str()),
        );
    }
}

async fn get_series(
    State(state): State<AppStateArc>,
    Path(metric): Path<String>,
    params: Result<Query<SeriesParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let resolved = resolve_series(&state, &metric, &params).await?;

    let mut response = Json(&resolved.points).into_response();
    tag_provenance(&state, &resolved, &mut response);
    Ok(response)
}

/// Series with exceedance flags and the threshold overlay
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedResponse {
    pub metric: MetricType,
    pub time_frame: TimeFrame,
    pub unit: &'static str,
    pub threshold: f64,
    pub points: Vec<DataPoint>,
    pub exceeded: Vec<bool>,
    pub exceeded_count: usize,
    pub threshold_line: Vec<DataPoint>,
    pub summary: SeriesSummary,
}

async fn get_annotated(
    State(state): State<AppStateArc>,
    Path(metric): Path<String>,
    params: Result<Query<SeriesParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let resolved = resolve_series(&state, &metric, &params).await?;

    let threshold_line = threshold::threshold_line(&resolved.points, resolved.threshold);
    let summary = threshold::summarize(&resolved.points);
    let annotated = threshold::annotate(resolved.points.clone(), resolved.threshold);
    let exceeded_count = annotated.exceeded_count();

    let body = AnnotatedResponse {
        metric: resolved.metric,
        time_frame: resolved.time_frame,
        unit: resolved.metric.entry().unit,
        threshold: resolved.threshold,
        points: annotated.series,
        exceeded_count,
        exceeded: annotated.exceeded,
        threshold_line,
        summary,
    };

    let mut response = Json(body).into_response();
    tag_provenance(&state, &resolved, &mut response);
    Ok(response)
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

async fn ingest_reading(
    State(state): State<AppStateArc>,
    payload: Result<Json<ReadingPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let reading = payload.into_reading(Utc::now())?;

    let store = state
        .resolver
        .query_service()
        .store()
        .cloned()
        .ok_or(StoreError::NotConfigured)?;

    let id = tokio::task::spawn_blocking(move || store.insert(&reading)).await??;
    info!("  Stored reading {}", id);

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            success: true,
            message: "reading stored".to_string(),
            id,
        }),
    ))
}

// ============================================================================
// Catalog Routes
// ============================================================================

pub fn catalog_routes() -> Router<AppStateArc> {
    Router::new().route("/api/metrics", get(list_metrics))
}

async fn list_metrics() -> Json<&'static [MetricCatalogEntry]> {
    Json(MetricCatalog::entries())
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub data_mode: String,
    pub store_available: bool,
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        data_mode: state.resolver.mode().to_string(),
        store_available: state.resolver.query_service().has_store(),
    })
}
