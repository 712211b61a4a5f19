use std::future::Future;

use snafu::{ensure, OptionExt, ResultExt};

use crate::config::{StoreBackend, StoreConfig};
use crate::model::*;

pub use error::*;
pub use memory::MemoryStore;
pub use surreal::SurrealStore;

mod error;
mod memory;
mod surreal;

/// Keyed persistence for [WatchRecord]s.
///
/// Writes are optimistic: `create` fails with [DatabaseError::Conflict] when the key already
/// exists, and `update` fails with it when the stored `version` no longer matches the one on the
/// given record. A successful `update` stores the record with its version incremented.
pub trait ProgressStore: Send + Sync {
    fn find(&self, key: &WatchKey) -> impl Future<Output = Result<Option<WatchRecord>>> + Send;

    fn create(&self, record: &WatchRecord) -> impl Future<Output = Result<WatchRecord>> + Send;

    fn update(&self, record: &WatchRecord) -> impl Future<Output = Result<WatchRecord>> + Send;
}

/// The store picked at startup.
#[derive(Debug, Clone)]
pub enum Backend {
    Memory(MemoryStore),
    Surreal(SurrealStore),
}

impl Backend {
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        match config.backend {
            StoreBackend::Memory => {
                tracing::info!("using the in-memory progress store");
                Ok(Backend::Memory(MemoryStore::new()))
            }
            StoreBackend::Surreal => SurrealStore::connect(&config.surreal)
                .await
                .map(Backend::Surreal),
        }
    }
}

impl ProgressStore for Backend {
    async fn find(&self, key: &WatchKey) -> Result<Option<WatchRecord>> {
        match self {
            Backend::Memory(store) => store.find(key).await,
            Backend::Surreal(store) => store.find(key).await,
        }
    }

    async fn create(&self, record: &WatchRecord) -> Result<WatchRecord> {
        match self {
            Backend::Memory(store) => store.create(record).await,
            Backend::Surreal(store) => store.create(record).await,
        }
    }

    async fn update(&self, record: &WatchRecord) -> Result<WatchRecord> {
        match self {
            Backend::Memory(store) => store.update(record).await,
            Backend::Surreal(store) => store.update(record).await,
        }
    }
}
