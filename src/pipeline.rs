//! Batch collection of product records
//!
//! Resolves identifiers one at a time and keeps the ones that produced a
//! record, in input order.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::info;

use crate::data::{Fetcher, ProductId, ProductRecord};

/// Anything that can resolve an identifier to a record or to nothing
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn fetch(&self, id: &ProductId) -> Option<ProductRecord>;
}

#[async_trait]
impl ProductSource for Fetcher {
    async fn fetch(&self, id: &ProductId) -> Option<ProductRecord> {
        Fetcher::fetch(self, id).await
    }
}

/// Resolves every identifier sequentially and returns the successful records
///
/// Identifiers that resolve to nothing are dropped without error. The result
/// preserves input order, so callers can compare its length with `ids.len()`
/// to detect missing products.
pub async fn collect_records<S>(source: &S, ids: &[ProductId]) -> Vec<ProductRecord>
where
    S: ProductSource + ?Sized,
{
    let records: Vec<ProductRecord> = stream::iter(ids)
        .then(|id| source.fetch(id))
        .filter_map(|record| async move { record })
        .collect()
        .await;

    info!(
        requested = ids.len(),
        collected = records.len(),
        "Collected product records"
    );
    records
}
