//! Session handlers: login, logout, heartbeat.

use axum::Json;
use axum::extract::State;

use seatguard_auth::{AllocationOutcome, MissingEntity};
use seatguard_core::error::AppError;
use seatguard_entity::session::SessionToken;

use crate::dto::request::{LoginRequest, TokenRequest};
use crate::dto::response::{
    ApiResponse, HeartbeatResponse, LoginResponse, LogoutResponse, UserSummary,
};
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /api/login
///
/// Verifies credentials, then asks the allocator for a seat in the user's
/// organization.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = state
        .engine
        .store
        .find_user_by_username(&req.username)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    let hasher = state.password_hasher.clone();
    let password = req.password;
    let hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))??;

    if !verified {
        tracing::info!(username = %user.username, "Login refused: invalid credentials");
        return Err(ApiError::invalid_credentials());
    }

    match state
        .engine
        .allocator
        .try_allocate(user.organization_id, user.id)
        .await?
    {
        AllocationOutcome::Admitted { token, session } => {
            Ok(Json(ApiResponse::ok(LoginResponse {
                token: token.as_str().to_string(),
                session_id: session.id,
                user: UserSummary::from(&user),
            })))
        }
        AllocationOutcome::Rejected { reason, .. } => Err(ApiError::no_seats(reason)),
        AllocationOutcome::NotFound(MissingEntity::Organization) => {
            Err(ApiError::not_found("Organization not found"))
        }
        // The user vanished between lookup and allocation.
        AllocationOutcome::NotFound(MissingEntity::User) => Err(ApiError::invalid_credentials()),
    }
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TokenRequest>,
) -> Result<Json<ApiResponse<LogoutResponse>>, ApiError> {
    let token = SessionToken::from_presented(req.token);
    let released = state.engine.ledger.destroy(&token).await?;
    Ok(Json(ApiResponse::ok(LogoutResponse { released })))
}

/// POST /api/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TokenRequest>,
) -> Result<Json<ApiResponse<HeartbeatResponse>>, ApiError> {
    let token = SessionToken::from_presented(req.token);
    if !state.engine.ledger.touch(&token).await? {
        return Err(ApiError::session_inactive());
    }
    Ok(Json(ApiResponse::ok(HeartbeatResponse { active: true })))
}
