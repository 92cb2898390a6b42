//! Domain service for the product catalog.
//!
//! Storefront reads run the filter engine over the stored list. Admin writes
//! reconcile images against object storage before the record is persisted.

use serde::Serialize;
use thiserror::Error;

use crate::catalog::{FilterBounds, FilterState};
use crate::db::StoreError;
use crate::domain::{Condition, ProductId};
use crate::models::{Product, ProductDraft};
use crate::storage::StorageError;

/// Errors specific to catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    #[error("Image storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Product store failed: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Optional storefront filters as they arrive from a query string or CLI.
///
/// Unset fields impose no restriction; an unset ceiling falls back to the
/// highest price in the catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub brand: Option<String>,
    pub max_price: Option<f64>,
    pub conditions: Vec<Condition>,
    pub processor: Option<String>,
    pub ram: Option<String>,
}

impl CatalogQuery {
    #[must_use]
    pub fn into_state(self, products: &[Product]) -> FilterState {
        let mut state = FilterState::for_catalog(products).with_conditions(self.conditions);
        if let Some(brand) = self.brand {
            state = state.with_brand(brand);
        }
        if let Some(max_price) = self.max_price {
            state = state.with_max_price(max_price);
        }
        if let Some(processor) = self.processor {
            state = state.with_processor(processor);
        }
        if let Some(ram) = self.ram {
            state = state.with_ram(ram);
        }
        state
    }
}

/// Filtered products plus the ranges for rendering filter controls.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListing {
    pub products: Vec<Product>,
    pub bounds: FilterBounds,
}

/// Domain service trait for the catalog.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// All products, newest first.
    async fn list(&self) -> Result<Vec<Product>, CatalogError>;

    /// Runs the filter engine over the full catalog.
    async fn search(&self, query: CatalogQuery) -> Result<ProductListing, CatalogError>;

    async fn featured(&self) -> Result<Vec<Product>, CatalogError>;

    async fn new_arrivals(&self) -> Result<Vec<Product>, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product has this id.
    async fn get(&self, id: &ProductId) -> Result<Product, CatalogError>;

    /// Uploads inline images, then stores a new product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] if any upload fails; nothing is stored.
    async fn create(&self, draft: ProductDraft) -> Result<Product, CatalogError>;

    /// Replaces a product, reconciling its images against the stored ones.
    ///
    /// Images dropped by the edit are deleted after the record is written.
    /// Failures there are logged and do not fail the update.
    async fn update(&self, id: &ProductId, draft: ProductDraft) -> Result<Product, CatalogError>;

    /// Removes a product and then its images.
    async fn delete(&self, id: &ProductId) -> Result<(), CatalogError>;
}
