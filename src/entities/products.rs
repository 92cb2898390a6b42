use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub brand: String,
    pub price: f64,
    /// One of `New`, `Used`, `Refurbished`
    pub condition: String,
    /// JSON array of hosted image references, in display order.
    pub images: String,
    pub processor: String,
    pub ram: String,
    pub storage: String,
    pub display: String,
    pub battery: String,
    pub description: String,
    pub featured: bool,
    pub new_arrival: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
