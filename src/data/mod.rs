//! Core data models for the price sheet generator
//!
//! This module contains the product types shared by the loader, the fetcher
//! and the renderer, along with the submodules that produce them.

pub mod extract;
pub mod fetcher;
pub mod loader;
pub mod transport;

pub use extract::{Extractor, SelectorExtractor};
pub use fetcher::{FetchError, FetchOptions, Fetcher, Sleeper, TokioSleeper};
pub use loader::{load_ids, LoadError};
pub use transport::{HttpResponse, HttpTransport, Transport, TransportError};

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepted identifier shape: one or more decimal digits
static ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

/// Error returned when a token is not a valid product identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid product id: '{0}'")]
pub struct InvalidProductId(pub String);

/// Identifier of a catalogue entry
///
/// Only strings made of decimal digits can be constructed, so every
/// `ProductId` that reaches the fetcher is safe to use as a URL path segment
/// and as a cache file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Validates `value` and wraps it as a `ProductId`
    pub fn parse(value: &str) -> Result<Self, InvalidProductId> {
        if ID_PATTERN.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(InvalidProductId(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductId {
    type Error = InvalidProductId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

/// Name and price as extracted from a product page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    pub name: String,
    /// Displayed price text, currency symbol included
    pub price: String,
}

/// A product successfully resolved from the catalogue
///
/// `price` is kept as the displayed text; no arithmetic is ever done on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: ProductId,
    pub name: String,
    pub price: String,
}

impl ProductRecord {
    pub fn new(product_id: ProductId, details: ProductDetails) -> Self {
        Self {
            product_id,
            name: details.name,
            price: details.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_accepts_digits() {
        let id = ProductId::parse("0123").unwrap();
        assert_eq!(id.as_str(), "0123");
        assert_eq!(id.to_string(), "0123");
    }

    #[test]
    fn test_product_id_rejects_non_digits() {
        for bad in ["", "abc", "12a", " 12", "12 ", "-1", "1.5", "١٢"] {
            assert!(ProductId::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_record_serializes_with_flat_string_fields() {
        let record = ProductRecord {
            product_id: ProductId::parse("111").unwrap(),
            name: "Red".to_string(),
            price: "$1".to_string(),
        };

        let value: serde_json::Value = serde_json::to_value(&record).unwrap();

        assert_eq!(
            value,
            serde_json::json!({"product_id": "111", "name": "Red", "price": "$1"})
        );
    }

    #[test]
    fn test_record_deserialization_rejects_invalid_id() {
        let json = r#"{"product_id": "abc", "name": "Red", "price": "$1"}"#;
        assert!(serde_json::from_str::<ProductRecord>(json).is_err());
    }
}
