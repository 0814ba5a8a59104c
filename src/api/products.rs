//! Product API Endpoints
//! Mission: Expose the catalogue; writes are admin-only at the router level

use crate::{
    api::routes::{ApiError, AppState},
    auth::models::Claims,
    models::{Product, ProductInput},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// GET /products
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<Product>>>, ApiError> {
    let products = state.products.list().await?;
    Ok(DataResponse::ok(products))
}

/// POST /products (Admin only)
pub async fn create_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<DataResponse<Product>>), ApiError> {
    let product = state.products.create(&input).await?;
    info!("📦 Product {} created by {}", product.id, claims.user_id);
    Ok((StatusCode::CREATED, DataResponse::ok(product)))
}

/// PUT /products/:id (Admin only)
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<Json<DataResponse<Product>>, ApiError> {
    state
        .products
        .update(&id, &input)
        .await?
        .map(DataResponse::ok)
        .ok_or(ApiError::NotFound("Product not found".to_string()))
}

/// DELETE /products/:id (Admin only)
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.products.delete(&id).await? {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    info!("🗑️  Product deleted: {}", id);
    Ok(Json(json!({
        "success": true,
        "message": "Product deleted successfully",
    })))
}
