//! Storefront product filtering.
//!
//! Every predicate is optional: an empty text filter or an empty condition
//! set imposes no restriction. The price ceiling is always applied, and by
//! default sits at the highest price in the catalog so it never binds.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::constants::pricing::FALLBACK_PRICE_CEILING;
use crate::domain::Condition;
use crate::models::Product;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub brand: String,
    pub max_price: f64,
    pub conditions: Vec<Condition>,
    pub processor: String,
    pub ram: String,
}

impl FilterState {
    /// Unrestricted state whose ceiling is the highest price in `products`.
    #[must_use]
    pub fn for_catalog(products: &[Product]) -> Self {
        Self {
            brand: String::new(),
            max_price: max_price(products),
            conditions: Vec::new(),
            processor: String::new(),
            ram: String::new(),
        }
    }

    /// Clears every filter and recomputes the ceiling from the current catalog.
    pub fn reset(&mut self, products: &[Product]) {
        *self = Self::for_catalog(products);
    }

    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    #[must_use]
    pub const fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = max_price;
        self
    }

    #[must_use]
    pub fn with_conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions = conditions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_processor(mut self, processor: impl Into<String>) -> Self {
        self.processor = processor.into();
        self
    }

    #[must_use]
    pub fn with_ram(mut self, ram: impl Into<String>) -> Self {
        self.ram = ram.into();
        self
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        contains_ignore_case(&product.brand, &self.brand)
            && product.price <= self.max_price
            && (self.conditions.is_empty() || self.conditions.contains(&product.condition))
            && contains_ignore_case(&product.specs.processor, &self.processor)
            && contains_ignore_case(&product.specs.ram, &self.ram)
    }
}

/// Returns the products matching `state`, in their original order.
#[must_use]
pub fn filter(products: &[Product], state: &FilterState) -> Vec<Product> {
    products
        .iter()
        .filter(|p| state.matches(p))
        .cloned()
        .collect()
}

/// Highest price in the list, or `0.0` when it is empty.
#[must_use]
pub fn max_price(products: &[Product]) -> f64 {
    products.iter().map(|p| p.price).fold(0.0, f64::max)
}

#[must_use]
pub fn featured(products: &[Product]) -> Vec<Product> {
    products.iter().filter(|p| p.featured).cloned().collect()
}

#[must_use]
pub fn new_arrivals(products: &[Product]) -> Vec<Product> {
    products.iter().filter(|p| p.new_arrival).cloned().collect()
}

/// Value ranges a storefront needs to render its filter controls.
#[derive(Debug, Clone, Serialize)]
pub struct FilterBounds {
    pub max_price: f64,
    pub fallback_ceiling: f64,
    pub brands: Vec<String>,
    pub conditions: Vec<Condition>,
}

impl FilterBounds {
    #[must_use]
    pub fn for_catalog(products: &[Product]) -> Self {
        let brands: BTreeSet<String> = products
            .iter()
            .map(|p| p.brand.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();

        Self {
            max_price: max_price(products),
            fallback_ceiling: FALLBACK_PRICE_CEILING,
            brands: brands.into_iter().collect(),
            conditions: Condition::ALL.to_vec(),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
