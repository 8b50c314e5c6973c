//! REST API routes for sync operations.
//!
//! Thin JSON layer over [`SyncManager`]: parse the request, call the
//! manager, map errors to HTTP statuses.

use crate::error::AppError;
use crate::models::dashboard::DashboardView;
use crate::models::hierarchy::HierarchyNode;
use crate::models::sync_status::{DispatchResult, SyncJobStatus};
use crate::services::sync_manager::SyncManager;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

// ── Error handling ───────────────────────────────────────────────────────────

/// JSON error body.
#[derive(Serialize)]
struct ApiError {
    code: String,
    message: String,
}

/// Wrapper to make AppError usable as an axum error response.
pub struct ApiErr(AppError);

impl ApiErr {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::RemoteCall { .. } => (StatusCode::BAD_GATEWAY, "REMOTE_ERROR"),
            AppError::UnknownState { .. } => (StatusCode::BAD_GATEWAY, "UNKNOWN_STATE"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            log::error!("[api] {}", self.0);
        }
        (
            status,
            Json(ApiError {
                code: code.to_string(),
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

// ── Request types ────────────────────────────────────────────────────────────

/// Body of `POST /api/sync`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub repo_ids: Vec<i64>,
}

/// Query of `GET /api/sync/status`, e.g. `?repoIds=1,2,3`.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "repoIds")]
    pub repo_ids: Option<String>,
}

fn require_ids(ids: Vec<i64>) -> Result<Vec<i64>, AppError> {
    if ids.is_empty() {
        return Err(AppError::invalid_input_field(
            "At least one repository ID is required",
            "repoIds",
        ));
    }
    Ok(ids)
}

/// Parse a comma-separated list of repository IDs.
fn parse_ids(raw: &str) -> Result<Vec<i64>, AppError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|_| {
                AppError::invalid_input_field(
                    format!("Invalid repository ID: {}", part),
                    "repoIds",
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    require_ids(ids)
}

// ── Routes ───────────────────────────────────────────────────────────────────

pub fn sync_api_routes() -> Router<SyncManager> {
    Router::new()
        .route("/api/sync", post(dispatch_sync))
        .route("/api/sync/status", get(sync_status))
        .route("/api/sync/{repo_id}", delete(cancel_sync))
        .route("/api/products/{product_id}/sync", post(sync_product))
        .route(
            "/api/organizations/{org_id}/sync/hierarchy",
            get(organization_hierarchy),
        )
        .route(
            "/api/organizations/{org_id}/sync/dashboard",
            get(organization_dashboard),
        )
}

/// POST /api/sync
async fn dispatch_sync(
    State(manager): State<SyncManager>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<Vec<DispatchResult>>, ApiErr> {
    let ids = require_ids(request.repo_ids)?;
    Ok(Json(manager.dispatch_sync(&ids).await))
}

/// GET /api/sync/status?repoIds=1,2,3
async fn sync_status(
    State(manager): State<SyncManager>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<SyncJobStatus>>, ApiErr> {
    let ids = parse_ids(query.repo_ids.as_deref().unwrap_or_default())?;
    Ok(Json(manager.report_status(&ids).await))
}

/// DELETE /api/sync/{repo_id}
async fn cancel_sync(
    State(manager): State<SyncManager>,
    Path(repo_id): Path<i64>,
) -> Result<StatusCode, ApiErr> {
    manager.cancel_sync(repo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/products/{product_id}/sync
async fn sync_product(
    State(manager): State<SyncManager>,
    Path(product_id): Path<i64>,
) -> Result<Json<Vec<DispatchResult>>, ApiErr> {
    Ok(Json(manager.sync_product(product_id).await?))
}

async fn organization_hierarchy(
    State(manager): State<SyncManager>,
    Path(org_id): Path<i64>,
) -> Result<Json<Vec<HierarchyNode>>, ApiErr> {
    Ok(Json(manager.organization_hierarchy(org_id).await?))
}

async fn organization_dashboard(
    State(manager): State<SyncManager>,
    Path(org_id): Path<i64>,
) -> Result<Json<DashboardView>, ApiErr> {
    Ok(Json(manager.dashboard(org_id).await?))
}
