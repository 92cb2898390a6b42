//! Object storage for product images.
//!
//! Uploads return a durable hosted reference; deletes take that reference
//! back. Deleting something that is already gone reports
//! [`StorageError::NotFound`] so callers can treat it as done.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{ImageBackend, ImagesConfig};

pub mod local;
pub mod s3;

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Reference does not belong to this store: {0}")]
    ForeignReference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(String),
}

impl StorageError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` and returns the hosted reference clients use to fetch it.
    async fn upload(&self, bytes: Vec<u8>, mime_type: &str) -> Result<String, StorageError>;

    /// Removes the object behind `reference`.
    async fn delete(&self, reference: &str) -> Result<(), StorageError>;

    fn backend_name(&self) -> &'static str;
}

/// Builds the object store selected by `images.backend`.
pub async fn create_object_store(config: &ImagesConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    match config.backend {
        ImageBackend::Local => {
            info!(path = %config.local_path, "Using local image storage");
            let store = LocalObjectStore::new(&config.local_path, &config.public_prefix).await?;
            Ok(Arc::new(store))
        }
        ImageBackend::S3 => {
            info!(bucket = %config.s3.bucket, "Using S3 image storage");
            let store = S3ObjectStore::new(&config.s3).await?;
            Ok(Arc::new(store))
        }
    }
}

/// File extension for an uploaded image of the given MIME type.
pub(crate) fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/avif" => "avif",
        "image/svg+xml" => "svg",
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("bin"),
    }
}

/// Random object name for a new upload.
pub(crate) fn object_name(mime_type: &str) -> String {
    format!("{}.{}", uuid::Uuid::new_v4(), extension_for(mime_type))
}
