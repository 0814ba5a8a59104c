//! Authentication API Endpoints
//! Mission: Provide login, logout and the admin panel

use crate::auth::{
    error::AuthError,
    issuer::TokenIssuer,
    jwt::{peek_expiry, JwtHandler},
    middleware::{bearer_token, RequestGate},
    models::{Claims, LoginRequest, LoginResponse, MessageResponse, SessionInfo, LOGIN_REDIRECT},
    revocation::RevocationStore,
};
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub issuer: Arc<TokenIssuer>,
    pub jwt: Arc<JwtHandler>,
    pub revocations: Arc<dyn RevocationStore>,
    pub gate: Arc<RequestGate>,
}

impl AuthState {
    pub fn new(
        issuer: Arc<TokenIssuer>,
        jwt: Arc<JwtHandler>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        let gate = Arc::new(RequestGate::new(jwt.clone(), revocations.clone()));
        Self {
            issuer,
            jwt,
            revocations,
            gate,
        }
    }
}

/// Login endpoint - POST /login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    info!("🔐 Login attempt: {}", payload.username);

    // bcrypt is deliberately slow; keep it off the async workers
    let issuer = state.issuer.clone();
    let issued = tokio::task::spawn_blocking(move || {
        issuer.login(&payload.username, &payload.password)
    })
    .await
    .map_err(AuthError::internal)??;

    Ok(Json(LoginResponse {
        success: true,
        token: issued.token,
        redirect: LOGIN_REDIRECT.to_string(),
        role: issued.claims.role,
        expires_in: issued.expires_in,
    }))
}

/// Logout endpoint - POST /logout
///
/// The presented token is revoked without being verified. Values that do not
/// decode to a token with an `exp` are not recorded; the response is the same.
pub async fn logout(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, (StatusCode, Json<MessageResponse>)> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(MessageResponse::failed("No token provided")),
            )
        })?;

    let Some(exp) = peek_expiry(token) else {
        debug!("Logout with undecodable token, nothing to revoke");
        return Ok(Json(MessageResponse::ok("Logged out successfully")));
    };
    let expires_at = exp.min(Utc::now().timestamp() + state.jwt.lifetime_secs());

    state
        .revocations
        .insert(token, expires_at)
        .await
        .map_err(|e| {
            error!("Logout error: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse::failed("Logout failed")),
            )
        })?;

    info!("👋 Session token revoked");
    Ok(Json(MessageResponse::ok("Logged out successfully")))
}

/// Admin panel - GET /admin (Admin only)
pub async fn admin_panel(Extension(claims): Extension<Claims>) -> Json<MessageResponse> {
    info!("🛡️  Admin panel accessed by {}", claims.user_id);
    Json(MessageResponse::ok("Welcome to admin panel"))
}

/// Current session - GET /me
/// Built from the verified claims (no database lookup needed)
pub async fn current_user(Extension(claims): Extension<Claims>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": SessionInfo::from_claims(&claims),
    }))
}
