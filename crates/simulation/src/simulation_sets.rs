//! Deterministic pipeline ordering via `SystemSet` phases.
//!
//! Every system the junction plugin adds to `FixedUpdate` lives in one of
//! these sets, so the order of a tick is explicit and testable rather than
//! left to the scheduler.
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim**: tick counter.
//! * **Simulation**: one full pipeline pass (generate, classify, allocate,
//!   alert, record).
//! * **PostSim**: reporting only, such as the periodic session summary and
//!   the driver's end-of-run export. These read pipeline state and never
//!   mutate it.

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
///
/// Configured as a chain: `PreSim` → `Simulation` → `PostSim`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    PreSim,
    Simulation,
    PostSim,
}
