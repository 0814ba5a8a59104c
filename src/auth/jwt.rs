//! JWT Token Handler
//! Mission: Sign session tokens and verify them against the server secret

use crate::auth::models::{Claims, User};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

/// Session tokens live exactly one hour
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_secs: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime_secs: TOKEN_LIFETIME_SECS,
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &User) -> Result<(String, Claims)> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: user.id.to_string(),
            role: user.role,
            iat: now as usize,
            exp: (now + self.lifetime_secs) as usize,
            jti: Uuid::new_v4().simple().to_string(),
        };

        debug!(
            "Generating JWT for user {} ({}), expires in {}s",
            user.username, user.id, self.lifetime_secs
        );

        let token = self.sign(&claims)?;
        Ok((token, claims))
    }

    /// Sign an arbitrary claim set with the server secret
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .context("Failed to generate JWT")
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .context("Invalid or expired token")?;

        debug!("Validated JWT for user {}", decoded.claims.user_id);

        Ok(decoded.claims)
    }
}

#[derive(Deserialize)]
struct ExpiryOnly {
    exp: Option<i64>,
}

/// Read the claimed `exp` without checking the signature or expiry.
///
/// Only used to size revocation records; never to make an access decision.
pub fn peek_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<ExpiryOnly>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.exp)
}
