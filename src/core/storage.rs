//! Key-value persistence port used by the quote store

use anyhow::Result;
use async_trait::async_trait;

/// Persisted quote list, JSON array of records.
pub const QUOTES_KEY: &str = "quotes";
/// Persisted category filter, plain string.
pub const FILTER_KEY: &str = "selectedCategory";
/// Timestamp of the last successful sync, RFC 3339.
pub const LAST_SYNCED_KEY: &str = "lastSyncedAt";
/// Session scoped index into the filtered view.
pub const LAST_VIEWED_KEY: &str = "lastViewedQuote";

/// String key-value storage. Backends decide durability; the quote store
/// only relies on get/set semantics.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}
