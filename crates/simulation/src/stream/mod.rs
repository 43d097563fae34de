//! Stream generator: per-approach counts and speeds, one sample per tick.
//!
//! Synthetic scenarios are driven by a seeded RNG; recorded scenarios replay
//! one of the bundled recordings cyclically.

pub mod generator;
pub mod recorded;
pub mod scenario;

pub use generator::{speed_for_count, StreamGenerator, MAX_SPEED_KMH, MIN_SPEED_KMH};
pub use recorded::RecordedDataset;
pub use scenario::{RecordedSet, Scenario, ScenarioPreset};
