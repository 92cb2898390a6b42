//! Admin catalog management. Every route here sits behind the session check.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_product;
use super::{ApiError, ApiResponse, AppState, MessageResponse, ProductPayload};
use crate::domain::ProductId;
use crate::models::Product;

/// `GET /api/admin/products`
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = state.catalog.list().await?;
    Ok(Json(ApiResponse::success(products)))
}

/// `POST /api/admin/products`
///
/// Inline images are uploaded before anything is stored; if one upload
/// fails the product is not created.
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let images = &state.config.images;
    let draft = validate_product(payload, images.max_image_bytes, &images.public_prefix)?;

    let product = state
        .catalog
        .create(draft)
        .await
        .map_err(ApiError::from_save)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

/// `PUT /api/admin/products/{id}`
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let images = &state.config.images;
    let draft = validate_product(payload, images.max_image_bytes, &images.public_prefix)?;

    let product = state
        .catalog
        .update(&ProductId::from(id), draft)
        .await
        .map_err(ApiError::from_save)?;

    Ok(Json(ApiResponse::success(product)))
}

/// `DELETE /api/admin/products/{id}`
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = ProductId::from(id);
    state.catalog.delete(&id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Product {id} deleted"
    )))))
}
