use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::ProductSpecs;

/// Per-field validation messages, keyed by request field path.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            fields: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            fields: None,
        }
    }

    pub fn invalid(message: impl Into<String>, fields: FieldErrors) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            fields: Some(fields),
        }
    }
}

/// Admin create/update body.
///
/// Every field is optional at the serde level so that missing values surface
/// as field errors instead of a blanket deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductPayload {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub condition: Option<String>,
    /// Hosted references or `data:` URLs, in display order.
    pub images: Option<Vec<String>>,
    pub specs: ProductSpecs,
    pub description: String,
    pub featured: bool,
    pub new_arrival: bool,
}

/// Storefront listing query. `condition` is a comma-separated list.
///
/// `max_price` stays textual so that a blank `max_price=` reaches validation
/// instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    pub brand: Option<String>,
    pub max_price: Option<String>,
    pub condition: Option<String>,
    pub processor: Option<String>,
    pub ram: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
