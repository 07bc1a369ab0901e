//! HTTP read API using axum.
//!
//! Routes:
//! - GET /health - Health check
//! - GET /stats - Store statistics
//! - GET /notams?location=X - Active notices, most urgent first
//! - GET /navaids - Derived navaid availability
//! - PUT /navaids/{id} - Operator override on a navaid flag

use crate::equipment::EquipmentBoard;
use crate::store::NotamStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use common::{EquipmentStatus, NavaidState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: NotamStore,
    pub board: EquipmentBoard,
    /// Airfield used when a query names no location.
    pub default_location: String,
}

/// Query parameters for the notams endpoint.
#[derive(Debug, Deserialize)]
pub struct NotamQuery {
    pub location: Option<String>,
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/notams", get(notams_handler))
        .route("/navaids", get(navaids_handler))
        .route("/navaids/{navaid}", put(override_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Store statistics.
/// GET /stats
async fn stats_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.stats())
}

/// Active notices for a location, severity-presorted. Absence of data is an
/// empty list, never an error.
/// GET /notams?location=X
async fn notams_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NotamQuery>,
) -> impl IntoResponse {
    let location = query
        .location
        .map(|l| l.to_uppercase())
        .unwrap_or_else(|| state.default_location.clone());

    let notams = state
        .store
        .query_active(&location, Utc::now())
        .into_iter()
        .map(|record| NotamEntry {
            id: record.id,
            text: record.canonical_text,
        })
        .collect();

    Json(NotamsResponse { notams })
}

#[derive(Serialize)]
struct NotamsResponse {
    notams: Vec<NotamEntry>,
}

#[derive(Serialize)]
struct NotamEntry {
    id: String,
    text: String,
}

/// Current navaid availability.
/// GET /navaids
async fn navaids_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(NavaidsResponse {
        navaids: state.board.status(Utc::now()),
    })
}

#[derive(Serialize)]
struct NavaidsResponse {
    navaids: EquipmentStatus,
}

/// Operator override for a navaid flag. The override lasts its configured
/// TTL and then lapses back to the derived value.
/// PUT /navaids/{navaid}
async fn override_handler(
    State(state): State<Arc<AppState>>,
    Path(navaid): Path<String>,
    Json(body): Json<OverrideRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if state.board.set_override(&navaid, body.state, Utc::now()) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Unknown navaid '{navaid}'")))
    }
}

#[derive(Debug, Deserialize)]
struct OverrideRequest {
    state: NavaidState,
}

// ============================================================================
// Error Handling
// ============================================================================

/// API error types.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}
