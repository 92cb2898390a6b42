//! Store-agnostic implementation of the `CatalogService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::{self, FilterBounds, ImageReconciler, ReconcilePlan};
use crate::db::{ProductStore, StoreResult, now_timestamp};
use crate::domain::ProductId;
use crate::models::{Product, ProductDraft};
use crate::services::catalog_service::{
    CatalogError, CatalogQuery, CatalogService, ProductListing,
};
use crate::storage::ObjectStore;

pub struct DefaultCatalogService {
    products: Arc<dyn ProductStore>,
    reconciler: ImageReconciler,
}

impl DefaultCatalogService {
    #[must_use]
    pub fn new(products: Arc<dyn ProductStore>, images: Arc<dyn ObjectStore>) -> Self {
        Self {
            products,
            reconciler: ImageReconciler::new(images),
        }
    }

    async fn existing(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.products
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Passes `written` through; on failure the images uploaded for the
    /// record are removed again first.
    async fn rollback_on_error(
        &self,
        written: StoreResult<()>,
        product: &Product,
        uploaded: &[String],
    ) -> Result<(), CatalogError> {
        if let Err(e) = written {
            warn!(
                product_id = %product.id,
                error = %e,
                "Record write failed, removing freshly uploaded images"
            );
            self.reconciler.cleanup(uploaded).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for DefaultCatalogService {
    async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list().await?)
    }

    async fn search(&self, query: CatalogQuery) -> Result<ProductListing, CatalogError> {
        let all = self.products.list().await?;
        let state = query.into_state(&all);

        Ok(ProductListing {
            products: catalog::filter(&all, &state),
            bounds: FilterBounds::for_catalog(&all),
        })
    }

    async fn featured(&self) -> Result<Vec<Product>, CatalogError> {
        let all = self.products.list().await?;
        Ok(catalog::featured(&all))
    }

    async fn new_arrivals(&self) -> Result<Vec<Product>, CatalogError> {
        let all = self.products.list().await?;
        Ok(catalog::new_arrivals(&all))
    }

    async fn get(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.existing(id).await
    }

    async fn create(&self, mut draft: ProductDraft) -> Result<Product, CatalogError> {
        let plan = ReconcilePlan::new(&[], std::mem::take(&mut draft.images));
        let reconciliation = self.reconciler.apply(plan).await?;

        let now = now_timestamp();
        let product = draft.into_product(
            ProductId::generate(),
            reconciliation.final_refs,
            now.clone(),
            now,
        );

        let written = self.products.create(&product).await;
        self.rollback_on_error(written, &product, &reconciliation.uploaded)
            .await?;

        info!(
            product_id = %product.id,
            images = product.images.len(),
            uploaded = reconciliation.uploaded.len(),
            "Product created"
        );
        Ok(product)
    }

    async fn update(
        &self,
        id: &ProductId,
        mut draft: ProductDraft,
    ) -> Result<Product, CatalogError> {
        let existing = self.existing(id).await?;

        let plan = ReconcilePlan::new(&existing.images, std::mem::take(&mut draft.images));
        let reconciliation = self.reconciler.apply(plan).await?;

        let product = draft.into_product(
            existing.id,
            reconciliation.final_refs,
            existing.created_at,
            now_timestamp(),
        );

        let written = self.products.update(&product).await;
        self.rollback_on_error(written, &product, &reconciliation.uploaded)
            .await?;

        let failed = self.reconciler.cleanup(&reconciliation.to_delete).await;
        info!(
            product_id = %product.id,
            uploaded = reconciliation.uploaded.len(),
            removed = reconciliation.to_delete.len() - failed,
            cleanup_failures = failed,
            "Product updated"
        );
        Ok(product)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), CatalogError> {
        let existing = self.existing(id).await?;

        if !self.products.delete(id).await? {
            return Err(CatalogError::NotFound(id.clone()));
        }

        let failed = self.reconciler.cleanup(&existing.images).await;
        info!(
            product_id = %id,
            cleanup_failures = failed,
            "Product deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{JsonFileStore, StoreError};
    use crate::domain::Condition;
    use crate::models::{ImageSource, ProductSpecs};
    use crate::storage::{LocalObjectStore, StorageError};

    struct Fixture {
        _dir: tempfile::TempDir,
        images_root: std::path::PathBuf,
        store: Arc<JsonFileStore>,
        service: DefaultCatalogService,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let images_root = dir.path().join("images");
        let store = Arc::new(
            JsonFileStore::open(
                dir.path().join("products.json"),
                dir.path().join("credentials.json"),
            )
            .await
            .unwrap(),
        );
        let images = Arc::new(LocalObjectStore::new(&images_root, "/images").await.unwrap());
        let service = DefaultCatalogService::new(store.clone(), images);

        Fixture {
            _dir: dir,
            images_root,
            store,
            service,
        }
    }

    fn png(tag: &str) -> ImageSource {
        ImageSource::Inline {
            bytes: tag.as_bytes().to_vec(),
            mime_type: "image/png".to_string(),
        }
    }

    fn draft(brand: &str, price: f64, images: Vec<ImageSource>) -> ProductDraft {
        ProductDraft {
            name: format!("{brand} laptop"),
            brand: brand.to_string(),
            price,
            condition: Condition::New,
            images,
            specs: ProductSpecs {
                processor: "Intel Core i5".to_string(),
                ram: "16GB".to_string(),
                ..ProductSpecs::default()
            },
            description: String::new(),
            featured: false,
            new_arrival: false,
        }
    }

    fn file_for(root: &std::path::Path, reference: &str) -> std::path::PathBuf {
        root.join(reference.trim_start_matches("/images/"))
    }

    #[tokio::test]
    async fn test_create_uploads_inline_images() {
        let f = fixture().await;

        let product = f
            .service
            .create(draft(
                "Dell",
                899.0,
                vec![png("front"), ImageSource::Hosted("https://cdn/x.png".into())],
            ))
            .await
            .unwrap();

        assert_eq!(product.images.len(), 2);
        assert!(product.images[0].starts_with("/images/"));
        assert_eq!(product.images[1], "https://cdn/x.png");
        assert!(file_for(&f.images_root, &product.images[0]).exists());
        assert_eq!(f.service.get(&product.id).await.unwrap(), product);
    }

    #[tokio::test]
    async fn test_update_replaces_dropped_images() {
        let f = fixture().await;
        let created = f
            .service
            .create(draft("HP", 700.0, vec![png("a"), png("b")]))
            .await
            .unwrap();
        let (kept, dropped) = (created.images[0].clone(), created.images[1].clone());

        let updated = f
            .service
            .update(
                &created.id,
                draft("HP", 650.0, vec![ImageSource::Hosted(kept.clone()), png("c")]),
            )
            .await
            .unwrap();

        assert_eq!(updated.images[0], kept);
        assert_ne!(updated.images[1], dropped);
        assert_eq!(updated.created_at, created.created_at);
        assert!(file_for(&f.images_root, &kept).exists());
        assert!(!file_for(&f.images_root, &dropped).exists());
        assert!(file_for(&f.images_root, &updated.images[1]).exists());
    }

    #[tokio::test]
    async fn test_delete_cascades_and_tolerates_missing_images() {
        let f = fixture().await;
        let created = f
            .service
            .create(draft("Asus", 500.0, vec![png("one"), png("two")]))
            .await
            .unwrap();

        std::fs::remove_file(file_for(&f.images_root, &created.images[0])).unwrap();
        f.service.delete(&created.id).await.unwrap();

        assert!(!file_for(&f.images_root, &created.images[1]).exists());
        assert!(matches!(
            f.service.get(&created.id).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            f.service.delete(&created.id).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let f = fixture().await;
        let err = f
            .service
            .update(&ProductId::from("nope"), draft("Acer", 300.0, vec![png("x")]))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_applies_filters_and_bounds() {
        let f = fixture().await;
        for (brand, price) in [("Apple", 500.0), ("Dell", 1200.0), ("Apple", 300.0)] {
            f.service
                .create(draft(brand, price, vec![png(brand)]))
                .await
                .unwrap();
        }

        let all = f.service.search(CatalogQuery::default()).await.unwrap();
        assert_eq!(all.products.len(), 3);
        assert!((all.bounds.max_price - 1200.0).abs() < f64::EPSILON);
        assert_eq!(all.bounds.brands, vec!["Apple", "Dell"]);

        let cheap_apple = f
            .service
            .search(CatalogQuery {
                brand: Some("apple".to_string()),
                max_price: Some(400.0),
                ..CatalogQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(cheap_apple.products.len(), 1);
        assert!((cheap_apple.products[0].price - 300.0).abs() < f64::EPSILON);
    }

    struct RejectingImages;

    #[async_trait]
    impl ObjectStore for RejectingImages {
        async fn upload(&self, _bytes: Vec<u8>, _mime: &str) -> Result<String, StorageError> {
            Err(StorageError::S3("bucket unavailable".to_string()))
        }

        async fn delete(&self, _reference: &str) -> Result<(), StorageError> {
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "rejecting"
        }
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_record_untouched() {
        let f = fixture().await;
        let created = f
            .service
            .create(draft("Lenovo", 999.0, vec![png("orig")]))
            .await
            .unwrap();

        let broken = DefaultCatalogService::new(f.store.clone(), Arc::new(RejectingImages));
        let err = broken
            .update(&created.id, draft("Lenovo", 1.0, vec![png("new")]))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)));

        let create_err = broken
            .create(draft("Lenovo", 1.0, vec![png("new")]))
            .await
            .unwrap_err();
        assert!(matches!(create_err, CatalogError::Storage(_)));

        assert_eq!(f.service.list().await.unwrap(), vec![created]);
    }

    fn stored_files(root: &std::path::Path) -> usize {
        std::fs::read_dir(root).map_or(0, Iterator::count)
    }

    /// Serves reads from the inner store but refuses every write.
    struct ReadOnlyProducts(Arc<JsonFileStore>);

    #[async_trait]
    impl ProductStore for ReadOnlyProducts {
        async fn create(&self, _product: &Product) -> StoreResult<()> {
            Err(StoreError::Database("disk full".to_string()))
        }

        async fn get(&self, id: &ProductId) -> StoreResult<Option<Product>> {
            self.0.get(id).await
        }

        async fn update(&self, _product: &Product) -> StoreResult<()> {
            Err(StoreError::Database("disk full".to_string()))
        }

        async fn delete(&self, id: &ProductId) -> StoreResult<bool> {
            self.0.delete(id).await
        }

        async fn list(&self) -> StoreResult<Vec<Product>> {
            self.0.list().await
        }

        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "read-only"
        }
    }

    /// Uploads normally but cannot delete anything.
    struct UndeletableImages(LocalObjectStore);

    #[async_trait]
    impl ObjectStore for UndeletableImages {
        async fn upload(&self, bytes: Vec<u8>, mime_type: &str) -> Result<String, StorageError> {
            self.0.upload(bytes, mime_type).await
        }

        async fn delete(&self, _reference: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only volume",
            )))
        }

        fn backend_name(&self) -> &'static str {
            "undeletable"
        }
    }

    #[tokio::test]
    async fn test_failed_create_write_removes_new_uploads() {
        let f = fixture().await;
        let images = Arc::new(LocalObjectStore::new(&f.images_root, "/images").await.unwrap());
        let products = Arc::new(ReadOnlyProducts(f.store.clone()));
        let broken = DefaultCatalogService::new(products, images);

        let err = broken
            .create(draft("Razer", 2199.0, vec![png("a"), png("b")]))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Store(StoreError::Database(_))));
        assert_eq!(stored_files(&f.images_root), 0);
        assert!(f.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_write_keeps_old_images() {
        let f = fixture().await;
        let created = f
            .service
            .create(draft("MSI", 1299.0, vec![png("old")]))
            .await
            .unwrap();
        assert_eq!(stored_files(&f.images_root), 1);

        let images = Arc::new(LocalObjectStore::new(&f.images_root, "/images").await.unwrap());
        let products = Arc::new(ReadOnlyProducts(f.store.clone()));
        let broken = DefaultCatalogService::new(products, images);

        let err = broken
            .update(&created.id, draft("MSI", 999.0, vec![png("new")]))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Store(_)));
        // Only the original image survives; the new upload was rolled back.
        assert_eq!(stored_files(&f.images_root), 1);
        assert!(file_for(&f.images_root, &created.images[0]).exists());
        assert_eq!(f.service.get(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_succeeds_when_cleanup_fails() {
        let f = fixture().await;
        let created = f
            .service
            .create(draft("Framework", 1049.0, vec![png("keep"), png("drop")]))
            .await
            .unwrap();
        let dropped = created.images[1].clone();

        let local = LocalObjectStore::new(&f.images_root, "/images").await.unwrap();
        let stubborn =
            DefaultCatalogService::new(f.store.clone(), Arc::new(UndeletableImages(local)));

        let updated = stubborn
            .update(
                &created.id,
                draft(
                    "Framework",
                    999.0,
                    vec![ImageSource::Hosted(created.images[0].clone()), png("fresh")],
                ),
            )
            .await
            .unwrap();

        assert_eq!(updated.images[0], created.images[0]);
        assert_ne!(updated.images[1], dropped);
        assert_eq!(f.service.get(&created.id).await.unwrap(), updated);
        // The delete failed, so the dropped file is left behind.
        assert!(file_for(&f.images_root, &dropped).exists());

        stubborn.delete(&created.id).await.unwrap();
        assert!(matches!(
            f.service.get(&created.id).await,
            Err(CatalogError::NotFound(_))
        ));
    }
}
