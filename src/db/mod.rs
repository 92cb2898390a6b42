//! Persistence for products and the admin credential record.
//!
//! Two interchangeable backends implement [`ProductStore`] and
//! [`CredentialStore`]: a flat JSON file ([`JsonFileStore`]) and a
//! SeaORM-managed database ([`Store`]). [`open`] picks one from config.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::domain::ProductId;
use crate::models::Product;

pub mod json;
pub mod migrator;
pub mod repositories;
mod store;

pub use json::JsonFileStore;
pub use store::Store;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Product {0} not found")]
    NotFound(ProductId),

    #[error("Product {0} already exists")]
    Duplicate(ProductId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The single admin credential record. Only the password hash is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub username: String,
    pub password_hash: String,
    pub updated_at: String,
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts a new product. Fails with [`StoreError::Duplicate`] if the id is taken.
    async fn create(&self, product: &Product) -> StoreResult<()>;

    async fn get(&self, id: &ProductId) -> StoreResult<Option<Product>>;

    /// Replaces an existing product. Fails with [`StoreError::NotFound`] if absent.
    async fn update(&self, product: &Product) -> StoreResult<()>;

    /// Removes a product, returning whether it existed.
    async fn delete(&self, id: &ProductId) -> StoreResult<bool>;

    /// All products, newest first.
    async fn list(&self) -> StoreResult<Vec<Product>>;

    async fn ping(&self) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The stored record, or `None` if none was ever written.
    async fn get(&self) -> StoreResult<Option<CredentialRecord>>;

    /// Replaces the record in one write.
    async fn set(&self, record: &CredentialRecord) -> StoreResult<()>;
}

#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn ProductStore>,
    pub credentials: Arc<dyn CredentialStore>,
}

/// Opens the backend selected by `storage.backend`.
pub async fn open(config: &StorageConfig) -> anyhow::Result<Stores> {
    match config.backend {
        StorageBackend::Json => {
            info!(path = %config.json_path, "Using JSON file storage");
            let store =
                Arc::new(JsonFileStore::open(&config.json_path, &config.credentials_path).await?);
            Ok(Stores {
                products: store.clone(),
                credentials: store,
            })
        }
        StorageBackend::Database => {
            let store = Arc::new(
                Store::with_pool_options(
                    &config.database_url,
                    config.max_db_connections,
                    config.min_db_connections,
                )
                .await?,
            );
            Ok(Stores {
                products: store.clone(),
                credentials: store,
            })
        }
    }
}

/// Timestamp format shared by every backend. Fixed width, so string order
/// matches chronological order.
#[must_use]
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Newest first; ties keep their relative order.
pub(crate) fn sort_newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
