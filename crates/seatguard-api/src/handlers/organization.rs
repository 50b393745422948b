//! Organization seat reports: status, live sessions and audit trail.

use axum::Json;
use axum::extract::{Path, Query, State};

use seatguard_auth::SeatStatus;
use seatguard_core::types::OrganizationId;
use seatguard_entity::audit::AuditRecord;

use crate::dto::request::AuditQuery;
use crate::dto::response::{ActiveSessionResponse, ApiResponse};
use crate::error::ApiError;
use crate::extractors::SessionAuth;
use crate::state::AppState;

/// GET /api/organizations/{id}/seats
pub async fn seat_status(
    State(state): State<AppState>,
    auth: SessionAuth,
    Path(organization_id): Path<OrganizationId>,
) -> Result<Json<ApiResponse<SeatStatus>>, ApiError> {
    auth.require_organization(organization_id)?;

    let status = state
        .engine
        .allocator
        .seat_status(organization_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Organization not found"))?;

    Ok(Json(ApiResponse::ok(status)))
}

/// GET /api/organizations/{id}/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: SessionAuth,
    Path(organization_id): Path<OrganizationId>,
) -> Result<Json<ApiResponse<Vec<ActiveSessionResponse>>>, ApiError> {
    auth.require_organization(organization_id)?;

    let ledger = &state.engine.ledger;
    let now = ledger.now();
    let sessions = ledger
        .list_active(organization_id)
        .await?
        .iter()
        .map(|s| ActiveSessionResponse::from_session(s, now))
        .collect();

    Ok(Json(ApiResponse::ok(sessions)))
}

/// GET /api/organizations/{id}/audit
pub async fn audit_trail(
    State(state): State<AppState>,
    auth: SessionAuth,
    Path(organization_id): Path<OrganizationId>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<ApiResponse<Vec<AuditRecord>>>, ApiError> {
    auth.require_organization(organization_id)?;

    let records = state
        .engine
        .audit
        .query(organization_id, query.limit)
        .await?;

    Ok(Json(ApiResponse::ok(records)))
}
