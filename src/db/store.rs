use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use super::repositories::credentials::CredentialRepository;
use super::repositories::product::ProductRepository;
use super::{CredentialRecord, CredentialStore, ProductStore, StoreResult, migrator};
use crate::domain::ProductId;
use crate::models::Product;

/// Database-backed store (SQLite by default).
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:");
        if db_url.starts_with("sqlite:") && !path_str.starts_with(":memory:") {
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn product_repo(&self) -> ProductRepository {
        ProductRepository::new(self.conn.clone())
    }

    fn credential_repo(&self) -> CredentialRepository {
        CredentialRepository::new(self.conn.clone())
    }
}

#[async_trait]
impl ProductStore for Store {
    async fn create(&self, product: &Product) -> StoreResult<()> {
        self.product_repo().insert(product).await
    }

    async fn get(&self, id: &ProductId) -> StoreResult<Option<Product>> {
        self.product_repo().get(id).await
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        self.product_repo().update(product).await
    }

    async fn delete(&self, id: &ProductId) -> StoreResult<bool> {
        self.product_repo().delete(id).await
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        self.product_repo().list_newest_first().await
    }

    async fn ping(&self) -> StoreResult<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "database"
    }
}

#[async_trait]
impl CredentialStore for Store {
    async fn get(&self) -> StoreResult<Option<CredentialRecord>> {
        self.credential_repo().get().await
    }

    async fn set(&self, record: &CredentialRecord) -> StoreResult<()> {
        self.credential_repo().set(record).await
    }
}
