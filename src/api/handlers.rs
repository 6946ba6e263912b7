//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{Category, IntelligentCache};
use crate::config::Config;
use crate::error::{ApiError, CacheError};
use crate::metrics::{MetricsReport, PerformanceTracker};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::storage::MemoryStore;

/// Application state shared across all handlers.
///
/// The cache is internally synchronized and cheap to clone.
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: IntelligentCache,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: IntelligentCache) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration, backed by an in-memory store.
    pub fn from_config(config: &Config) -> Self {
        let tracker = Arc::new(PerformanceTracker::new(config.slow_operation_threshold()));
        let cache = IntelligentCache::new(config, Arc::new(MemoryStore::new()), tracker);
        Self::new(cache)
    }
}

type Result<T> = std::result::Result<T, ApiError>;

/// Handler for PUT /cache/:category/:key
pub async fn set_handler(
    State(state): State<AppState>,
    Path((category, key)): Path<(String, String)>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    let category: Category = category.parse()?;
    state.cache.set(&key, &req.value, category).await?;

    Ok(Json(SetResponse::new(key, category)))
}

/// Handler for GET /cache/:category/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path((category, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    let category: Category = category.parse()?;
    let value: Option<Value> = state.cache.get(&key, category).await?;

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, category, value))),
        None => Err(ApiError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:key
///
/// Succeeds whether or not the key was present.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.remove(&key).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /metrics
///
/// Generates a performance report, persists it, and returns it.
pub async fn metrics_handler(State(state): State<AppState>) -> Result<Json<MetricsReport>> {
    let report = state
        .cache
        .tracker()
        .report_metrics(state.cache.store().as_ref())
        .await
        .map_err(CacheError::from)?;

    Ok(Json(report))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
