pub mod relic;

pub use relic::{AttributeSet, ColorFilter, RawObservation, Relic, RelicColor, SLOT_COUNT};
