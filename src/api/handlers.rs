//! API Handlers
//!
//! HTTP request handlers for each diagnostics endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::error::Result;
use crate::layer::CacheLayer;
use crate::models::{
    HealthResponse, InvalidateParams, InvalidateResponse, RelatedParams, StatsResponse,
};
use crate::query::QueryCache;
use crate::remote::RemoteCache;

/// Application state shared across all handlers.
///
/// Holds handles to the caches of one [`CacheLayer`]; the layer itself
/// (and the lifecycle of its sweep tasks) stays with the caller.
#[derive(Clone)]
pub struct AppState {
    pub remote: RemoteCache,
    pub queries: QueryCache<Value>,
}

impl AppState {
    pub fn new(remote: RemoteCache, queries: QueryCache<Value>) -> Self {
        Self { remote, queries }
    }

    pub fn from_layer(layer: &CacheLayer) -> Self {
        Self::new(layer.remote().clone(), layer.queries().clone())
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        remote: state.remote.stats().into(),
        pending_fetches: state.remote.pending_count(),
        queries: state.queries.stats().into(),
    })
}

/// Handler for DELETE /cache
///
/// Clears the remote cache, or only the keys matching a non-empty `?pattern=`.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Query(params): Query<InvalidateParams>,
) -> Result<Json<InvalidateResponse>> {
    let pattern = params.pattern.as_deref().filter(|p| !p.is_empty());
    let removed = state.remote.invalidate(pattern)?;

    Ok(Json(InvalidateResponse::new(pattern.unwrap_or("*"), removed)))
}

/// Handler for DELETE /cache/related/:entity
pub async fn invalidate_related_handler(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(params): Query<RelatedParams>,
) -> Result<Json<InvalidateResponse>> {
    let removed = state.remote.invalidate_related(&entity, params.id())?;

    Ok(Json(InvalidateResponse::new(
        format!("entries related to {}", entity),
        removed,
    )))
}

/// Handler for DELETE /queries/:endpoint
pub async fn invalidate_queries_handler(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = state.queries.invalidate_queries(&endpoint);

    Json(InvalidateResponse::new(
        format!("queries of {}", endpoint),
        removed,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
