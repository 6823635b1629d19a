//! Cache manager for persisting product records to disk
//!
//! Provides a `CacheManager` that stores each record as `<identifier>.json`
//! inside a single cache directory.

use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{CacheBackend, CacheError};
use crate::data::{ProductId, ProductRecord};

/// Manages reading and writing cached records on disk
///
/// The file body is the bare JSON record (`product_id`, `name`, `price`) with
/// no envelope or schema version. Distinct identifiers map to distinct files,
/// so concurrent writers of different identifiers never contend.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager in the platform cache directory
    ///
    /// Uses `~/.cache/pricesheet/` on Linux, or equivalent XDG path on other platforms.
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn in_user_cache() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "pricesheet")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a CacheManager with a custom cache directory
    ///
    /// The directory is created lazily on the first write.
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the cache file for the given identifier
    pub fn cache_path(&self, id: &ProductId) -> PathBuf {
        self.cache_dir.join(format!("{}.json", id))
    }
}

impl CacheBackend for CacheManager {
    fn get(&self, id: &ProductId) -> Result<Option<ProductRecord>, CacheError> {
        let path = self.cache_path(id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: ProductRecord = serde_json::from_str(&content)
            .map_err(|source| CacheError::Corrupt {
                path: path.clone(),
                source,
            })?;

        if record.product_id != *id {
            return Err(CacheError::Mismatch {
                path,
                expected: id.clone(),
                found: record.product_id,
            });
        }
        Ok(Some(record))
    }

    fn put(&self, id: &ProductId, record: &ProductRecord) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir)?;
        let json = serde_json::to_string(record)?;
        fs::write(self.cache_path(id), json)?;
        Ok(())
    }
}
