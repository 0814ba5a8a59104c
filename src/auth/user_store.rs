//! User Storage
//! Mission: Store user accounts and verify credentials with SQLite + bcrypt

use crate::auth::models::{User, UserRole};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, types::Type, Connection, Row};
use tracing::{info, warn};
use uuid::Uuid;

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
    bcrypt_cost: u32,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        Self::with_cost(db_path, DEFAULT_COST)
    }

    /// Same as `new`, with an explicit bcrypt work factor
    pub fn with_cost(db_path: &str, bcrypt_cost: u32) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
            bcrypt_cost,
        };
        store.init_db()?;
        Ok(store)
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open user db at {}", self.db_path))
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Provision the admin account unless an admin already exists.
    ///
    /// Returns `true` when a new admin was created.
    pub fn ensure_admin(&self, username: &str, password: &str) -> Result<bool> {
        let conn = self.open()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'admin'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;

        if count > 0 {
            info!("Admin user already exists");
            return Ok(false);
        }

        self.create_user(username, password, UserRole::Admin)?;
        info!("🔐 Default admin user created (username: {})", username);
        warn!("⚠️  CHANGE DEFAULT PASSWORD IN PRODUCTION!");
        Ok(true)
    }

    /// Get user by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.open()?;

        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, role, created_at
             FROM users WHERE username = ?1",
        )?;

        match stmt.query_row(params![username], user_from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify username and password, returning the account on success.
    ///
    /// bcrypt compares digests in constant time.
    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.get_user_by_username(username)? else {
            return Ok(None);
        };

        let valid = verify(password, &user.password_hash).context("Failed to verify password")?;
        Ok(valid.then_some(user))
    }

    /// Create a new user
    pub fn create_user(&self, username: &str, password: &str, role: UserRole) -> Result<User> {
        let password_hash =
            hash(password, self.bcrypt_cost).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            role,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.open()?;
        conn.execute(
            "INSERT INTO users (id, username, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.username,
                user.password_hash,
                user.role.as_str(),
                user.created_at,
            ],
        )
        .context("Failed to insert user")?;

        info!(
            "✅ Created user: {} ({})",
            user.username,
            user.role.as_str()
        );

        Ok(user)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let role_str: String = row.get(3)?;
    Ok(User {
        id: Uuid::parse_str(&id)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        // Unknown roles get the least privilege
        role: UserRole::from_str(&role_str).unwrap_or(UserRole::User),
        created_at: row.get(4)?,
    })
}
