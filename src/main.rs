//! Storefront - authenticated product catalogue
//! Mission: Short-lived sessions, instant logout, admin-only writes

use anyhow::{Context, Result};
use clap::Parser;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_backend::{
    api::{build_router, AppState},
    auth::{
        jwt::TOKEN_LIFETIME_SECS, spawn_revocation_sweeper, AuthState, JwtHandler,
        RevocationStore, SqliteRevocationStore, TokenIssuer, UserStore,
    },
    config::{load_env, AppConfig, Cli, Command},
    middleware::RateLimitTiers,
    products::ProductStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let config = cli.config;
    config.validate()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::SeedAdmin => seed_admin(&config),
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    info!("🚀 Storefront backend starting");
    info!("💾 Database: {}", config.db_path);

    let users = Arc::new(
        UserStore::with_cost(&config.db_path, config.bcrypt_cost)
            .context("Failed to initialize user store")?,
    );
    users.ensure_admin(&config.admin_username, &config.admin_password)?;

    let jwt = Arc::new(JwtHandler::new(&config.jwt_secret()));
    let revocations: Arc<dyn RevocationStore> = Arc::new(
        SqliteRevocationStore::new(&config.db_path, TOKEN_LIFETIME_SECS)
            .context("Failed to initialize revocation store")?,
    );
    let products = Arc::new(
        ProductStore::new(&config.db_path).context("Failed to initialize product store")?,
    );

    let issuer = Arc::new(TokenIssuer::new(users, jwt.clone()));
    let auth_state = AuthState::new(issuer, jwt, revocations.clone());
    let app_state = AppState::new(auth_state, products, &RateLimitTiers::default());

    spawn_revocation_sweeper(revocations, config.revocation_sweep_interval());

    app_state.limiters.spawn_cleanup();

    let app = build_router(app_state);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

fn seed_admin(config: &AppConfig) -> Result<()> {
    let users = UserStore::with_cost(&config.db_path, config.bcrypt_cost)
        .context("Failed to initialize user store")?;

    let created = users.ensure_admin(&config.admin_username, &config.admin_password)?;
    info!("✅ Seed complete (admin created: {})", created);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received");
}

/// Initialize tracing with enhanced observability
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_backend=debug,storefront=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
