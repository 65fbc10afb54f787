//! sow-state
//!
//! Dedup memory: which literal status was last seen for each order id.
//!
//! Contract:
//! - `load` on a missing store yields an empty map
//! - `load` on an unreadable or corrupt store is an error (the run must stop)
//! - `save` replaces the whole mapping; a reader never sees a half-written store

mod file;
mod memory;

pub use file::JsonFileStateStore;
pub use memory::MemoryStateStore;
pub use sow_schemas::StatusMap;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("STATE_STORE_IO: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("STATE_STORE_CORRUPT: {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("STATE_STORE_ENCODE: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Load/save persistence for the status mapping.
pub trait StateStore {
    fn load(&self) -> Result<StatusMap, StateStoreError>;
    fn save(&self, statuses: &StatusMap) -> Result<(), StateStoreError>;
}
