//! Runtime configuration
//!
//! Every setting can come from a flag or an environment variable; `.env`
//! files are loaded first so they feed the env fallbacks.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";
const MIN_SECRET_LEN: usize = 32;

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Storefront backend - session auth and product catalogue")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub config: AppConfig,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the admin account if no admin exists, then exit
    SeedAdmin,
}

#[derive(Args, Debug, Clone)]
pub struct AppConfig {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0", global = true)]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000, global = true)]
    pub port: u16,

    /// SQLite database holding users, products and revoked tokens
    #[arg(long, env = "DB_PATH", default_value = "storefront.db", global = true)]
    pub db_path: String,

    /// HMAC secret for session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true, global = true)]
    pub jwt_secret: Option<String>,

    /// Seconds between revocation list purges
    #[arg(long, env = "REVOCATION_SWEEP_SECS", default_value_t = 60, global = true)]
    pub revocation_sweep_secs: u64,

    /// Username of the seeded admin account
    #[arg(long, env = "ADMIN_USERNAME", default_value = "admin", global = true)]
    pub admin_username: String,

    /// Password of the seeded admin account
    #[arg(
        long,
        env = "ADMIN_PASSWORD",
        default_value = "Admin@123",
        hide_env_values = true,
        global = true
    )]
    pub admin_password: String,

    /// bcrypt work factor for new password hashes
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST, global = true)]
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if !(4..=31).contains(&self.bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31, got {}", self.bcrypt_cost);
        }
        if self.db_path.trim().is_empty() {
            bail!("DB_PATH must not be empty");
        }
        Ok(())
    }

    /// The signing secret, falling back to a development value.
    pub fn jwt_secret(&self) -> String {
        match self.jwt_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => {
                if secret.len() < MIN_SECRET_LEN {
                    warn!(
                        "⚠️  JWT_SECRET is shorter than {} characters",
                        MIN_SECRET_LEN
                    );
                }
                secret.to_string()
            }
            _ => {
                warn!("⚠️  JWT_SECRET not set - using development secret. CHANGE IN PRODUCTION!");
                DEV_JWT_SECRET.to_string()
            }
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn revocation_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.revocation_sweep_secs.max(1))
    }
}

/// Load `.env` from the working directory (and parents), then from the crate root.
pub fn load_env() {
    let _ = dotenv::dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
