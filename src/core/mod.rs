//! Core quote abstractions and the store that owns them

pub mod config;
pub mod error;
pub mod log;
pub mod notify;
pub mod quote;
pub mod quote_store;
pub mod remote;
pub mod storage;

// Re-export main types for cleaner imports
pub use error::QuoteError;
pub use notify::{Notification, Notifier};
pub use quote::QuoteRecord;
pub use quote_store::QuoteStore;
pub use remote::RemoteQuoteSource;
pub use storage::KeyValueStorage;
