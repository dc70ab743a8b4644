//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use noticeboard_core::types::Announcement;

use crate::auth::AdminAuth;
use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

// ═══════════════════════════════════════════════════════════════════════════
// Public Handlers
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/announcements
pub async fn list_announcements(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListAnnouncementsResponse>> {
    let announcements = state.store.list().await?;
    debug!(count = announcements.len(), "Serving feed");

    Ok(Json(ListAnnouncementsResponse { announcements }))
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let count = match state.store.list().await {
        Ok(feed) => Some(feed.len()),
        Err(e) => {
            warn!(error = %e, "Health check could not read the store");
            None
        }
    };
    let divergence = state.store.divergence();

    Json(HealthResponse {
        status: if count.is_some() { "ok" } else { "degraded" }.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        announcements_count: count,
        backend: state.store.backend_summary(),
        fallback_writes: divergence.fallback_writes,
        last_divergence: divergence.last,
        admin_configured: state.gate.is_configured(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Admin Handlers
// ═══════════════════════════════════════════════════════════════════════════

/// POST /api/admin/validate
///
/// Lets the console check a token before showing the editor.
pub async fn validate_admin(_admin: AdminAuth) -> Json<OkResponse> {
    Json(OkResponse::ok())
}

/// POST /api/admin/announcements
pub async fn create_announcement(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Announcement>)> {
    let Json(payload) = payload?;
    let new = parse_create_request(payload)?;

    let entry = state.store.create(new).await?;
    info!(id = %entry.id, "Announcement published");

    Ok((StatusCode::CREATED, Json(entry)))
}

/// PATCH /api/admin/announcements/:id
pub async fn update_announcement(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Announcement>> {
    let Json(payload) = payload?;
    let patch = parse_update_request(payload)?;

    let entry = state.store.update(&id, patch).await?;
    info!(id = %entry.id, "Announcement edited");

    Ok(Json(entry))
}

/// DELETE /api/admin/announcements/:id
pub async fn delete_announcement(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>> {
    state.store.delete(&id).await?;
    info!(id = %id, "Announcement removed");

    Ok(Json(OkResponse::ok()))
}
