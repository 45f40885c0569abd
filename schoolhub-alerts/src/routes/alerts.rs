use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use schoolhub_shared::errors::AppResult;
use schoolhub_shared::middleware::ParentUser;
use schoolhub_shared::types::api::ApiResponse;

use crate::models::AnnotatedAlert;
use crate::services::alert_service;
use crate::AppState;

/// GET /alerts
/// The synthesized, read-annotated feed for the authenticated guardian.
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    ParentUser(user): ParentUser,
) -> AppResult<Json<ApiResponse<Vec<AnnotatedAlert>>>> {
    let alerts = alert_service::list_alerts(&state.db, user.id).await?;

    Ok(Json(ApiResponse::ok(alerts)))
}

/// POST /alerts/:id/read
/// Acknowledge a single alert id.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    ParentUser(user): ParentUser,
    Path(alert_id): Path<String>,
) -> AppResult<Json<ApiResponse<MarkReadResponse>>> {
    alert_service::mark_alert_read(&state.db, user.id, alert_id.clone()).await?;

    Ok(Json(ApiResponse::ok(MarkReadResponse { alert_id })))
}

#[derive(Debug, serde::Serialize)]
pub struct MarkReadResponse {
    pub alert_id: String,
}

/// POST /alerts/mark-all-read
/// Recompute the live feed and acknowledge everything in it.
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    ParentUser(user): ParentUser,
) -> AppResult<Json<ApiResponse<MarkAllReadResponse>>> {
    let marked = alert_service::mark_all_alerts_read(&state.db, user.id).await?;

    Ok(Json(ApiResponse::ok(MarkAllReadResponse { marked })))
}

#[derive(Debug, serde::Serialize)]
pub struct MarkAllReadResponse {
    pub marked: usize,
}
