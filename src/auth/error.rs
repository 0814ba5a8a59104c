//! Authentication error taxonomy
//! Mission: Map every auth failure to a terminal, machine-readable response

use crate::auth::models::FAILURE_REDIRECT;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::error;

/// Auth error types
#[derive(Debug)]
pub enum AuthError {
    /// Bad credentials at login
    Unauthorized,
    /// No bearer token presented
    Unauthenticated,
    /// Token is on the revocation list
    Revoked,
    /// Bad signature, malformed or expired token
    InvalidToken,
    /// Authenticated but lacking the required role
    Forbidden,
    /// Store or infrastructure fault; detail is logged, never returned
    InternalError(anyhow::Error),
}

impl AuthError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        AuthError::InternalError(err.into())
    }

    /// Stable code clients can branch on
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Unauthorized => "unauthorized",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::Revoked => "revoked",
            AuthError::InvalidToken => "invalid_token",
            AuthError::Forbidden => "forbidden",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Unauthorized
            | AuthError::Unauthenticated
            | AuthError::Revoked
            | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthError::Unauthorized => "Invalid credentials",
            AuthError::Unauthenticated => "Missing authorization token",
            AuthError::Revoked => "Token revoked",
            AuthError::InvalidToken => "Invalid or expired token",
            AuthError::Forbidden => "Admin access required",
            AuthError::InternalError(_) => "Authentication failed",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InternalError(err) => write!(f, "{}: {:#}", self.message(), err),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::InternalError(err) = &self {
            error!(error = %format!("{err:#}"), "Authentication internal error");
        }

        let body = Json(json!({
            "success": false,
            "error": self.code(),
            "message": self.message(),
            "redirect": FAILURE_REDIRECT,
        }));

        (self.status(), body).into_response()
    }
}
