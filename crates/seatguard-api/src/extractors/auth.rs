//! `SessionAuth` extractor: resolves the bearer token to an active session.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use seatguard_core::types::OrganizationId;
use seatguard_entity::session::{Session, SessionToken};

use crate::error::ApiError;
use crate::state::AppState;

/// The caller's active session.
///
/// Extraction counts as activity: the session's `last_activity` is
/// refreshed before it is resolved.
#[derive(Debug, Clone)]
pub struct SessionAuth(pub Session);

impl SessionAuth {
    /// The resolved session.
    pub fn session(&self) -> &Session {
        &self.0
    }

    /// Fail with 403 unless the session belongs to `organization_id`.
    pub fn require_organization(&self, organization_id: OrganizationId) -> Result<(), ApiError> {
        if self.0.organization_id != organization_id {
            return Err(ApiError::forbidden(
                "Session does not belong to this organization",
            ));
        }
        Ok(())
    }
}

impl FromRequestParts<AppState> for SessionAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let raw = header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

        let token = SessionToken::from_presented(raw);
        let ledger = &state.engine.ledger;
        if !ledger.touch(&token).await? {
            return Err(ApiError::session_inactive());
        }

        let session = ledger
            .resolve(&token)
            .await?
            .ok_or_else(ApiError::session_inactive)?;

        Ok(Self(session))
    }
}
