//! Maps domain errors and refusals to HTTP responses.
//!
//! Store and audit failures become a generic 503; their detail is logged
//! and never sent to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use seatguard_auth::RejectionReason;
use seatguard_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Create an error with an explicit status and code.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Unknown user or wrong password. Deliberately indistinguishable.
    pub fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Invalid username or password",
        )
    }

    /// The presented token does not identify an active session.
    pub fn session_inactive() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "SESSION_INACTIVE",
            "Session is not active",
        )
    }

    /// Missing or malformed credentials on a protected route.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// The caller may not access this resource.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// An allocation was refused.
    pub fn no_seats(reason: RejectionReason) -> Self {
        match reason {
            RejectionReason::SeatLimit => Self::new(
                StatusCode::FORBIDDEN,
                "NO_SEATS_AVAILABLE",
                "No seats available for this organization",
            ),
            RejectionReason::UserSessionLimit => Self::new(
                StatusCode::FORBIDDEN,
                "USER_SESSION_LIMIT",
                "Maximum concurrent sessions reached for this user",
            ),
        }
    }

    /// A referenced resource does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Malformed request body or parameters.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code of this error.
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err.kind {
            ErrorKind::Validation => Self::bad_request(err.message),
            ErrorKind::Authentication => Self::unauthorized(err.message),
            ErrorKind::NotFound => Self::not_found(err.message),
            ErrorKind::Conflict => Self::new(StatusCode::CONFLICT, "CONFLICT", err.message),
            ErrorKind::Store | ErrorKind::AuditWrite | ErrorKind::ServiceUnavailable => {
                tracing::error!(kind = %err.kind, error = %err.message, "Request aborted by backend failure");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable, please retry",
                )
            }
            ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Scheduler
            | ErrorKind::Internal => {
                tracing::error!(kind = %err.kind, error = %err.message, "Internal server error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorResponse {
            error: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
