//! Product fetcher with retry, backoff, throttling and caching
//!
//! Resolves a [`ProductId`] into a [`ProductRecord`] by consulting the cache,
//! then the catalogue over HTTP. Transient failures and rate limiting are
//! retried with exponential backoff; a page that does not parse is not.
//! Every terminal failure degrades to "absent" so a batch never aborts
//! because of a single identifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::extract::{Extractor, SelectorExtractor};
use super::transport::{Transport, TransportError};
use super::{ProductId, ProductRecord};
use crate::cache::{CacheBackend, CacheError};

/// Catalogue host used when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://example.com";

/// Maximum attempts per identifier, first one included
pub const DEFAULT_RETRIES: u32 = 3;

/// Delay before the second attempt, in seconds
pub const DEFAULT_BACKOFF_SECONDS: f64 = 1.0;

/// Reasons a fetch can end without a record
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection error, timeout or non-429 error status
    #[error("Transport failure: {0}")]
    TransportFailure(#[from] TransportError),

    /// The catalogue answered 429
    #[error("Rate limited by the catalogue")]
    RateLimited,

    /// Success status but the page lacks a price or heading element
    #[error("Could not parse product details")]
    ParseFailure,

    /// Cache entry unreadable; never terminal
    #[error("Cache corruption: {0}")]
    CacheCorruption(#[from] CacheError),
}

/// Invalid values for [`FetchOptions`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("retries must be at least 1")]
    ZeroRetries,

    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidSeconds { field: &'static str, value: f64 },
}

/// Retry and throttling policy for one fetch call
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// Maximum attempts including the first (always >= 1)
    pub retries: u32,
    /// Delay before the second attempt; doubles after every failed attempt
    pub backoff: Duration,
    /// Fixed pause before every attempt, first one included
    pub request_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            backoff: Duration::from_secs_f64(DEFAULT_BACKOFF_SECONDS),
            request_delay: Duration::ZERO,
        }
    }
}

impl FetchOptions {
    /// Builds options from user-facing values, validating each one
    ///
    /// # Arguments
    /// * `retries` - Maximum attempts, at least 1
    /// * `backoff_seconds` - Initial backoff, finite and >= 0
    /// * `request_delay_seconds` - Pause before each request, finite and >= 0
    pub fn from_seconds(
        retries: u32,
        backoff_seconds: f64,
        request_delay_seconds: f64,
    ) -> Result<Self, OptionsError> {
        if retries == 0 {
            return Err(OptionsError::ZeroRetries);
        }
        Ok(Self {
            retries,
            backoff: seconds("backoff", backoff_seconds)?,
            request_delay: seconds("request delay", request_delay_seconds)?,
        })
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, OptionsError> {
    Duration::try_from_secs_f64(value).map_err(|_| OptionsError::InvalidSeconds { field, value })
}

/// Suspends the calling flow; the seam that lets tests observe delays
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fetches product records from the catalogue
///
/// A single `Fetcher` is meant to be shared across a whole batch so that the
/// transport's connection pool is reused. It holds no mutable state of its
/// own; the retry counter and backoff live inside each [`Fetcher::fetch`] call.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    extractor: Box<dyn Extractor>,
    sleeper: Arc<dyn Sleeper>,
    cache: Option<Arc<dyn CacheBackend>>,
    options: FetchOptions,
    base_url: String,
}

impl Fetcher {
    /// Creates a fetcher with the default extractor, tokio timer, no cache and
    /// the default catalogue host
    pub fn new(transport: Arc<dyn Transport>, options: FetchOptions) -> Self {
        Self {
            transport,
            extractor: Box::new(SelectorExtractor::new()),
            sleeper: Arc::new(TokioSleeper),
            cache: None,
            options,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Enables caching through `cache`
    pub fn with_cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the timer used for request delays and backoff
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replaces the page parser, e.g. for a catalogue with different markup
    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Overrides the catalogue host (scheme and authority, optionally a path prefix)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// URL of the product page for `id`
    pub fn product_url(&self, id: &ProductId) -> String {
        format!("{}/products/{}", self.base_url.trim_end_matches('/'), id)
    }

    /// Fetches the record for `id`, or `None` when no data could be obtained
    ///
    /// Absence is an expected outcome; callers should skip the identifier
    /// rather than abort.
    pub async fn fetch(&self, id: &ProductId) -> Option<ProductRecord> {
        self.try_fetch(id).await.ok()
    }

    /// Like [`Fetcher::fetch`], but reports why the identifier came back empty
    ///
    /// On exhausted retries the error is the one from the final attempt.
    pub async fn try_fetch(&self, id: &ProductId) -> Result<ProductRecord, FetchError> {
        if let Some(record) = self.read_cache(id) {
            return Ok(record);
        }

        let url = self.product_url(id);
        let retries = self.options.retries.max(1);
        let mut backoff = self.options.backoff;
        let mut attempt = 1;

        loop {
            if !self.options.request_delay.is_zero() {
                self.sleeper.sleep(self.options.request_delay).await;
            }

            let err = match self.request(&url).await {
                Ok(body) => return self.complete(id, &body),
                Err(err) => err,
            };

            match &err {
                FetchError::RateLimited => warn!(
                    product_id = %id,
                    attempt,
                    retries,
                    "Rate limited when requesting product"
                ),
                _ => error!(
                    product_id = %id,
                    attempt,
                    retries,
                    error = %err,
                    "Failed to fetch product"
                ),
            }

            if attempt >= retries {
                return Err(err);
            }

            self.sleeper.sleep(backoff).await;
            backoff = backoff.saturating_mul(2);
            attempt += 1;
        }
    }

    /// Returns the cached record for `id`, treating any cache error as a miss
    fn read_cache(&self, id: &ProductId) -> Option<ProductRecord> {
        let cache = self.cache.as_ref()?;
        match cache.get(id) {
            Ok(Some(record)) => {
                debug!(product_id = %id, "Cache hit");
                Some(record)
            }
            Ok(None) => None,
            Err(err) => {
                let err = FetchError::from(err);
                warn!(product_id = %id, error = %err, "Cache entry unusable; refetching");
                None
            }
        }
    }

    /// Performs one HTTP attempt and classifies the outcome
    async fn request(&self, url: &str) -> Result<String, FetchError> {
        let response = self.transport.get(url).await?;
        if response.is_rate_limited() {
            return Err(FetchError::RateLimited);
        }
        if !response.is_success() {
            return Err(TransportError::Status(response.status).into());
        }
        Ok(response.body)
    }

    /// Turns a successful page into a record and stores it in the cache
    fn complete(&self, id: &ProductId, body: &str) -> Result<ProductRecord, FetchError> {
        let Some(details) = self.extractor.extract(body) else {
            error!(product_id = %id, "Could not parse product details");
            return Err(FetchError::ParseFailure);
        };

        let record = ProductRecord::new(id.clone(), details);

        if let Some(cache) = &self.cache {
            if let Err(err) = cache.put(id, &record) {
                warn!(product_id = %id, error = %err, "Failed to write cache entry");
            }
        }

        info!(
            product_id = %id,
            name = %record.name,
            price = %record.price,
            "Fetched product"
        );
        Ok(record)
    }
}
