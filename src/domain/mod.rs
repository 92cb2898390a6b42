//! Domain primitives for the laptop catalog.
//!
//! Newtypes and enums that keep raw strings from leaking across layers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of a product listing.
///
/// Generated identifiers are UUID v4 strings, but any non-empty string read
/// back from a store is accepted as-is.
///
/// # Examples
///
/// ```rust
/// use laptopstore::domain::ProductId;
///
/// let id = ProductId::from("abc-123");
/// assert_eq!(id.as_str(), "abc-123");
/// assert_eq!(id.to_string(), "abc-123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Physical condition of a listed laptop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    New,
    Used,
    Refurbished,
}

impl Condition {
    pub const ALL: [Self; 3] = [Self::New, Self::Used, Self::Refurbished];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Used => "Used",
            Self::Refurbished => "Refurbished",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown condition '{0}', expected one of New, Used, Refurbished")]
pub struct ParseConditionError(String);

impl FromStr for Condition {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseConditionError(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_parse_is_case_insensitive() {
        assert_eq!("new".parse::<Condition>().unwrap(), Condition::New);
        assert_eq!(" USED ".parse::<Condition>().unwrap(), Condition::Used);
        assert_eq!(
            "Refurbished".parse::<Condition>().unwrap(),
            Condition::Refurbished
        );
        assert!("broken".parse::<Condition>().is_err());
    }

    #[test]
    fn test_condition_serializes_as_variant_name() {
        let json = serde_json::to_string(&Condition::Refurbished).unwrap();
        assert_eq!(json, "\"Refurbished\"");
    }

    #[test]
    fn test_product_id_is_transparent() {
        let id = ProductId::from("p-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p-1\"");
        assert_ne!(ProductId::generate(), ProductId::generate());
    }
}
