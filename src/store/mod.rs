//! Storage backends for the [`KeyValueStorage`](crate::core::storage::KeyValueStorage) port

pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use anyhow::Result;
use disk::DiskStorage;
use memory::MemoryStorage;
use std::sync::Arc;

/// Durable and session storage for one process.
pub struct Storages {
    pub durable: Arc<DiskStorage>,
    pub session: Arc<MemoryStorage>,
}

impl Storages {
    pub fn open(config: &AppConfig) -> Result<Self> {
        let data_path = config.default_data_path()?;
        Ok(Self {
            durable: Arc::new(DiskStorage::open(&data_path)?),
            session: Arc::new(MemoryStorage::new()),
        })
    }
}
