//! Token Issuer
//! Mission: Exchange verified credentials for a signed one-hour session token

use crate::auth::{
    error::AuthError,
    jwt::JwtHandler,
    models::IssuedToken,
    user_store::UserStore,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct TokenIssuer {
    users: Arc<UserStore>,
    jwt: Arc<JwtHandler>,
}

impl TokenIssuer {
    pub fn new(users: Arc<UserStore>, jwt: Arc<JwtHandler>) -> Self {
        Self { users, jwt }
    }

    /// Verify `username`/`password` and mint a session token.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let user = self
            .users
            .verify_credentials(username, password)
            .map_err(AuthError::internal)?
            .ok_or_else(|| {
                warn!("❌ Failed login attempt: {}", username);
                AuthError::Unauthorized
            })?;

        let (token, claims) = self
            .jwt
            .generate_token(&user)
            .map_err(AuthError::internal)?;

        info!(
            "✅ Login successful: {} ({})",
            user.username,
            user.role.as_str()
        );

        Ok(IssuedToken {
            token,
            expires_in: self.jwt.lifetime_secs() as usize,
            claims,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;
    use tempfile::NamedTempFile;

    fn create_issuer() -> (TokenIssuer, Arc<JwtHandler>, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let users = UserStore::with_cost(temp_file.path().to_str().unwrap(), 4).unwrap();
        users.ensure_admin("admin", "Admin@123").unwrap();
        users.create_user("carol", "carol-pass", UserRole::User).unwrap();

        let jwt = Arc::new(JwtHandler::new("issuer-test-secret"));
        (
            TokenIssuer::new(Arc::new(users), jwt.clone()),
            jwt,
            temp_file,
        )
    }

    #[test]
    fn test_admin_login_issues_admin_token() {
        let (issuer, jwt, _temp) = create_issuer();

        let issued = issuer.login("admin", "Admin@123").unwrap();
        assert_eq!(issued.claims.role, UserRole::Admin);
        assert_eq!(issued.expires_in, 3600);
        assert_eq!(issued.claims.exp - issued.claims.iat, 3600);

        let claims = jwt.validate_token(&issued.token).unwrap();
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn test_standard_user_login() {
        let (issuer, _jwt, _temp) = create_issuer();

        let issued = issuer.login("carol", "carol-pass").unwrap();
        assert_eq!(issued.claims.role, UserRole::User);
    }

    #[test]
    fn test_bad_credentials_are_unauthorized() {
        let (issuer, _jwt, _temp) = create_issuer();

        assert!(matches!(
            issuer.login("admin", "nope"),
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            issuer.login("ghost", "Admin@123"),
            Err(AuthError::Unauthorized)
        ));
    }
}
