//! Store module - Generation records, the store trait and its backends

pub mod memory;
pub mod rest;
pub mod traits;

use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;

pub use memory::InMemoryRecordStore;
pub use rest::RestRecordStore;
pub use traits::{GenerationRecord, NewGenerationRecord, RecordStore};

/// Construct the store selected by configuration
pub fn from_config(config: &StoreConfig) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.backend {
        StoreBackend::Rest => Arc::new(RestRecordStore::new(config)?),
        StoreBackend::Memory => Arc::new(InMemoryRecordStore::new()),
    };
    Ok(store)
}
