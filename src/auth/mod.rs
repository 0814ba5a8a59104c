//! Authentication Module
//! Mission: Stateless session tokens with a server-side revocation list and RBAC

pub mod api;
pub mod error;
pub mod issuer;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod revocation;
pub mod user_store;

pub use api::AuthState;
pub use error::AuthError;
pub use issuer::TokenIssuer;
pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, require_admin, RequestGate};
pub use revocation::{
    spawn_revocation_sweeper, MemoryRevocationStore, RevocationStore, SqliteRevocationStore,
};
pub use user_store::UserStore;
