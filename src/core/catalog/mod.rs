//! The relic catalog: content-hash dedup, color indexing, and the persisted
//! relic table.

pub mod hasher;
pub mod store;

pub use hasher::{RelicHasher, SlotOrder};
pub use store::{ColorIndex, RelicStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("relic table error: {0}")]
    Csv(#[from] csv::Error),
}
