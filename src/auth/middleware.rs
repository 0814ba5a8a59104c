//! Authentication Middleware
//! Mission: Gate every protected request on revocation, signature and role

use crate::auth::{
    error::AuthError,
    jwt::JwtHandler,
    models::Claims,
    revocation::RevocationStore,
};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// Per-request token check: not revoked AND authentic AND unexpired
pub struct RequestGate {
    jwt: Arc<JwtHandler>,
    revocations: Arc<dyn RevocationStore>,
}

impl RequestGate {
    pub fn new(jwt: Arc<JwtHandler>, revocations: Arc<dyn RevocationStore>) -> Self {
        Self { jwt, revocations }
    }

    /// Run the full gate on a raw `Authorization` header value.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Claims, AuthError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(AuthError::Unauthenticated)?;

        self.check_revocation(token).await?;
        self.verify_signature(token)
    }

    /// Reject tokens on the deny-list; store faults never pass.
    pub async fn check_revocation(&self, token: &str) -> Result<(), AuthError> {
        let revoked = self
            .revocations
            .exists(token)
            .await
            .map_err(AuthError::internal)?;

        if revoked {
            debug!("Rejected revoked token");
            return Err(AuthError::Revoked);
        }
        Ok(())
    }

    /// Reject tokens with a bad signature, bad shape or past `exp`.
    pub fn verify_signature(&self, token: &str) -> Result<Claims, AuthError> {
        self.jwt
            .validate_token(token)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// Extract `<token>` from `Bearer <token>`
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Auth middleware that validates JWT tokens
pub async fn auth_middleware(
    State(gate): State<Arc<RequestGate>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let claims = gate.authenticate(header).await?;

    // Add claims to request extensions so handlers can access them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Require a verified admin identity
pub fn authorize_admin(claims: &Claims) -> Result<(), AuthError> {
    if claims.role.is_admin() {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Admin middleware; must be layered inside `auth_middleware`.
///
/// Only trusts claims that the request gate inserted.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AuthError> {
    let claims = extract_claims(&req).ok_or(AuthError::Unauthenticated)?;
    authorize_admin(claims)?;
    Ok(next.run(req).await)
}

/// Extract claims from request (use after auth middleware)
pub fn extract_claims(req: &Request) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}
