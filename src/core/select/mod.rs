//! Three-column relic selection under mutual-exclusion constraints.

pub mod column;
pub mod engine;

pub use column::ColumnState;
pub use engine::{CycleDirection, SelectionEngine, COLUMN_COUNT};
