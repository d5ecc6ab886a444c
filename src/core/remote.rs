//! Remote quote source abstraction

use crate::core::quote::QuoteRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Upper bound on the number of remote items taken per fetch.
pub const REMOTE_BATCH_LIMIT: usize = 5;

#[async_trait]
pub trait RemoteQuoteSource: Send + Sync {
    /// Fetches at most [`REMOTE_BATCH_LIMIT`] records, already mapped to quotes.
    async fn fetch_remote(&self) -> Result<Vec<QuoteRecord>>;

    /// One-way notification of a locally added record.
    async fn push_local(&self, record: &QuoteRecord) -> Result<()>;
}
