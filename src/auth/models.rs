//! Authentication Models
//! Mission: Define user identities, session claims and auth payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where clients are sent after a successful login
pub const LOGIN_REDIRECT: &str = "/products";

/// Where clients are sent after any auth failure
pub const FAILURE_REDIRECT: &str = "/login";

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: UserRole,
    pub created_at: String,
}

/// Coarse-grained roles, checked after authentication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "admin")]
    Admin, // Product management + admin panel
    #[serde(rename = "user")]
    User, // Read-only product access
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "user" => Some(UserRole::User),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub role: UserRole,
    pub iat: usize,
    pub exp: usize, // expiration timestamp
    pub jti: String, // keeps tokens minted in the same second distinct
}

/// A freshly minted session token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: usize, // seconds until expiration
    pub claims: Claims,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub redirect: String,
    pub role: UserRole,
    pub expires_in: usize,
}

/// Generic `{success, message}` body used by logout and the admin panel
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Identity exposed by `/me`
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub role: UserRole,
    pub exp: usize,
}

impl SessionInfo {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            role: claims.role,
            exp: claims.exp,
        }
    }
}
