use crate::db::{StoreError, StoreResult};
use crate::domain::{Condition, ProductId};
use crate::entities::{prelude::*, products};
use crate::models::{Product, ProductSpecs};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::info;

/// Repository for product rows
pub struct ProductRepository {
    conn: DatabaseConnection,
}

impl ProductRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_model(model: products::Model) -> StoreResult<Product> {
        let condition: Condition = model
            .condition
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("product {}: {e}", model.id)))?;
        let images: Vec<String> = serde_json::from_str(&model.images)
            .map_err(|e| StoreError::Corrupt(format!("product {} images: {e}", model.id)))?;

        Ok(Product {
            id: ProductId::from(model.id),
            name: model.name,
            brand: model.brand,
            price: model.price,
            condition,
            images,
            specs: ProductSpecs {
                processor: model.processor,
                ram: model.ram,
                storage: model.storage,
                display: model.display,
                battery: model.battery,
            },
            description: model.description,
            featured: model.featured,
            new_arrival: model.new_arrival,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    fn to_active_model(product: &Product) -> StoreResult<products::ActiveModel> {
        Ok(products::ActiveModel {
            id: Set(product.id.as_str().to_string()),
            name: Set(product.name.clone()),
            brand: Set(product.brand.clone()),
            price: Set(product.price),
            condition: Set(product.condition.as_str().to_string()),
            images: Set(serde_json::to_string(&product.images)?),
            processor: Set(product.specs.processor.clone()),
            ram: Set(product.specs.ram.clone()),
            storage: Set(product.specs.storage.clone()),
            display: Set(product.specs.display.clone()),
            battery: Set(product.specs.battery.clone()),
            description: Set(product.description.clone()),
            featured: Set(product.featured),
            new_arrival: Set(product.new_arrival),
            created_at: Set(product.created_at.clone()),
            updated_at: Set(product.updated_at.clone()),
        })
    }

    // ========================================================================
    // Product Operations
    // ========================================================================

    pub async fn insert(&self, product: &Product) -> StoreResult<()> {
        if Products::find_by_id(product.id.as_str())
            .one(&self.conn)
            .await?
            .is_some()
        {
            return Err(StoreError::Duplicate(product.id.clone()));
        }

        Products::insert(Self::to_active_model(product)?)
            .exec(&self.conn)
            .await?;

        info!("Added product {}: {}", product.id, product.name);
        Ok(())
    }

    pub async fn get(&self, id: &ProductId) -> StoreResult<Option<Product>> {
        Products::find_by_id(id.as_str())
            .one(&self.conn)
            .await?
            .map(Self::map_model)
            .transpose()
    }

    pub async fn update(&self, product: &Product) -> StoreResult<()> {
        if Products::find_by_id(product.id.as_str())
            .one(&self.conn)
            .await?
            .is_none()
        {
            return Err(StoreError::NotFound(product.id.clone()));
        }

        Self::to_active_model(product)?.update(&self.conn).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &ProductId) -> StoreResult<bool> {
        let result = Products::delete_by_id(id.as_str())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn list_newest_first(&self) -> StoreResult<Vec<Product>> {
        Products::find()
            .order_by_desc(products::Column::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(Self::map_model)
            .collect()
    }
}
