use serde::{Deserialize, Serialize};

use crate::domain::{Condition, ProductId};
use crate::models::image::ImageSource;

/// A persisted product listing. `images` only ever holds hosted references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub condition: Condition,
    pub images: Vec<String>,
    pub specs: ProductSpecs,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub new_arrival: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSpecs {
    pub processor: String,
    pub ram: String,
    pub storage: String,
    pub display: String,
    pub battery: String,
}

/// Validated admin submission for creating or updating a product.
///
/// Images are already classified; inline payloads still need uploading.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub condition: Condition,
    pub images: Vec<ImageSource>,
    pub specs: ProductSpecs,
    pub description: String,
    pub featured: bool,
    pub new_arrival: bool,
}

impl ProductDraft {
    /// Builds the record to persist once every image has a hosted reference.
    #[must_use]
    pub fn into_product(
        self,
        id: ProductId,
        images: Vec<String>,
        created_at: String,
        updated_at: String,
    ) -> Product {
        Product {
            id,
            name: self.name,
            brand: self.brand,
            price: self.price,
            condition: self.condition,
            images,
            specs: self.specs,
            description: self.description,
            featured: self.featured,
            new_arrival: self.new_arrival,
            created_at,
            updated_at,
        }
    }
}
