use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    api::products,
    auth::{api as auth_api, auth_middleware, require_admin, AuthState},
    middleware::{rate_limit_middleware, request_logging, RateLimitTiers, RateLimiters},
    products::ProductStore,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub products: Arc<ProductStore>,
    pub limiters: RateLimiters,
}

impl AppState {
    pub fn new(auth: AuthState, products: Arc<ProductStore>, tiers: &RateLimitTiers) -> Self {
        Self {
            auth,
            products,
            limiters: RateLimiters::new(tiers),
        }
    }
}

/// Create the API router
///
/// Layer order on protected routes, outermost first:
/// rate limit → request gate → admin gate → handler.
pub fn build_router(state: AppState) -> Router {
    let gate = state.auth.gate.clone();
    let limiters = state.limiters.clone();

    let login_routes = Router::new()
        .route("/login", post(auth_api::login))
        .route_layer(middleware::from_fn_with_state(
            limiters.auth.clone(),
            rate_limit_middleware,
        ))
        .with_state(state.auth.clone());

    let session_routes = Router::new()
        .route("/logout", post(auth_api::logout))
        .with_state(state.auth.clone());

    // Any verified session
    let authenticated_routes = Router::new()
        .route("/me", get(auth_api::current_user))
        .route_layer(middleware::from_fn_with_state(
            gate.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/admin", get(auth_api::admin_panel))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(
            gate.clone(),
            auth_middleware,
        ));

    // Reads need a session; writes additionally need the admin role
    let product_routes = Router::new()
        .route(
            "/products",
            get(products::list_products).merge(
                post(products::create_product).route_layer(middleware::from_fn(require_admin)),
            ),
        )
        .route(
            "/products/:id",
            put(products::update_product)
                .delete(products::delete_product)
                .route_layer(middleware::from_fn(require_admin)),
        )
        .route_layer(middleware::from_fn_with_state(gate, auth_middleware))
        .route_layer(middleware::from_fn_with_state(
            limiters.products.clone(),
            rate_limit_middleware,
        ))
        .with_state(state);

    let public_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(login_routes)
        .merge(session_routes)
        .merge(authenticated_routes)
        .merge(admin_routes)
        .merge(product_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_logging))
                .layer(middleware::from_fn_with_state(
                    limiters.global,
                    rate_limit_middleware,
                )),
        )
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

// ===== Error Handling =====

#[derive(Debug)]
pub enum ApiError {
    Database(anyhow::Error),
    NotFound(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Database(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Database(err) => {
                tracing::error!("Database error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}
