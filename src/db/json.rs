//! Flat-file backend: the whole catalog is one JSON array on disk and the
//! admin credential record sits in a sibling JSON object file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{
    CredentialRecord, CredentialStore, ProductStore, StoreError, StoreResult, sort_newest_first,
};
use crate::domain::ProductId;
use crate::models::Product;

pub struct JsonFileStore {
    products_path: PathBuf,
    credentials_path: PathBuf,
    /// Serialises read-modify-write cycles so concurrent requests never
    /// interleave partial writes.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub async fn open(
        products_path: impl AsRef<Path>,
        credentials_path: impl AsRef<Path>,
    ) -> StoreResult<Self> {
        let store = Self {
            products_path: products_path.as_ref().to_path_buf(),
            credentials_path: credentials_path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        };

        if !path_exists(&store.products_path).await {
            store.write_products(&[]).await?;
            info!(path = %store.products_path.display(), "Created empty product file");
        }

        Ok(store)
    }

    async fn read_products(&self) -> StoreResult<Vec<Product>> {
        match fs::read_to_string(&self.products_path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => {
                let products: Vec<Product> = serde_json::from_str(&content)?;
                debug!("Loaded {} products", products.len());
                Ok(products)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_products(&self, products: &[Product]) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(products)?;
        write_atomic(&self.products_path, content.as_bytes()).await
    }
}

#[async_trait]
impl ProductStore for JsonFileStore {
    async fn create(&self, product: &Product) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.read_products().await?;

        if products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::Duplicate(product.id.clone()));
        }

        products.push(product.clone());
        self.write_products(&products).await?;
        info!("Added product {}: {}", product.id, product.name);
        Ok(())
    }

    async fn get(&self, id: &ProductId) -> StoreResult<Option<Product>> {
        let products = self.read_products().await?;
        Ok(products.into_iter().find(|p| &p.id == id))
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.read_products().await?;

        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| StoreError::NotFound(product.id.clone()))?;
        *slot = product.clone();

        self.write_products(&products).await
    }

    async fn delete(&self, id: &ProductId) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.read_products().await?;

        let before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() == before {
            return Ok(false);
        }

        self.write_products(&products).await?;
        Ok(true)
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        let mut products = self.read_products().await?;
        sort_newest_first(&mut products);
        Ok(products)
    }

    async fn ping(&self) -> StoreResult<()> {
        fs::metadata(&self.products_path).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}

#[async_trait]
impl CredentialStore for JsonFileStore {
    async fn get(&self) -> StoreResult<Option<CredentialRecord>> {
        match fs::read_to_string(&self.credentials_path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, record: &CredentialRecord) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let content = serde_json::to_string_pretty(record)?;
        write_atomic(&self.credentials_path, content.as_bytes()).await
    }
}

/// Writes to a temporary sibling and renames it over `path`.
async fn write_atomic(path: &Path, content: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

async fn path_exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}
