//! Cache module for storing product records to disk
//!
//! This module provides the [`CacheBackend`] seam used by the fetcher and a
//! filesystem implementation that keeps one JSON file per product identifier.
//! Entries never expire. A corrupted entry surfaces as [`CacheError::Corrupt`],
//! or [`CacheError::Mismatch`] when it names another product, and the caller
//! decides how to recover.

mod manager;

pub use manager::CacheManager;

use std::path::PathBuf;

use thiserror::Error;

use crate::data::{ProductId, ProductRecord};

/// Errors that can occur when reading or writing cache entries
#[derive(Debug, Error)]
pub enum CacheError {
    /// The entry exists but does not deserialize into a record
    #[error("Cache entry {path} is corrupted: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The entry deserializes but belongs to a different identifier
    #[error("Cache entry {path} holds product {found}, expected {expected}")]
    Mismatch {
        path: PathBuf,
        expected: ProductId,
        found: ProductId,
    },

    /// The record could not be serialized
    #[error("Failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Filesystem failure
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage for previously fetched product records, keyed by identifier
pub trait CacheBackend: Send + Sync {
    /// Returns the stored record, `Ok(None)` when there is no entry
    fn get(&self, id: &ProductId) -> Result<Option<ProductRecord>, CacheError>;

    /// Stores `record` under `id`, replacing any existing entry
    fn put(&self, id: &ProductId, record: &ProductRecord) -> Result<(), CacheError>;
}
