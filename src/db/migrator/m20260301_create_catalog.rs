use crate::entities::prelude::*;
use crate::entities::products;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Products)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Storefront listings are always newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_products_created_at")
                    .table(Products)
                    .col(products::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // No seed row: an empty table means the placeholder credentials apply.
        manager
            .create_table(
                schema
                    .create_table_from_entity(AdminCredentials)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminCredentials).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Products).to_owned())
            .await?;

        Ok(())
    }
}
