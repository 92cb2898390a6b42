//! Public storefront endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::validation::{parse_conditions, validate_max_price};
use super::{ApiError, ApiResponse, AppState, ProductQuery};
use crate::domain::ProductId;
use crate::models::Product;
use crate::services::{CatalogQuery, ProductListing};

/// `GET /api/products`
///
/// Filters the catalog. Omitted parameters impose no restriction and an
/// omitted `max_price` defaults to the highest price in the catalog.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<ProductListing>>, ApiError> {
    let query = CatalogQuery {
        conditions: parse_conditions(query.condition.as_deref())?,
        max_price: validate_max_price(query.max_price.as_deref())?,
        brand: query.brand,
        processor: query.processor,
        ram: query.ram,
    };

    let listing = state.catalog.search(query).await?;
    Ok(Json(ApiResponse::success(listing)))
}

/// `GET /api/products/featured`
pub async fn featured_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = state.catalog.featured().await?;
    Ok(Json(ApiResponse::success(products)))
}

/// `GET /api/products/new-arrivals`
pub async fn new_arrivals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = state.catalog.new_arrivals().await?;
    Ok(Json(ApiResponse::success(products)))
}

/// `GET /api/products/{id}`
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state.catalog.get(&ProductId::from(id)).await?;
    Ok(Json(ApiResponse::success(product)))
}
