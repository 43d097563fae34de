//! Signal allocator: turns phase demand into a two-phase green split.
//!
//! - `allocator` - proportional split with bounds, redistribution and rate limit
//! - `delay` - per-vehicle wait estimate used for the delay-reduction figure
//! - `hybrid` - in-cycle hold/switch decisions for actuated operation
//! - `plan` - the immutable [`SignalPlan`] produced each tick

pub mod allocator;
pub mod delay;
pub mod hybrid;
pub mod plan;

pub use allocator::{allocate, demand_ratio};
pub use delay::{delay_reduction_pct, per_vehicle_wait};
pub use hybrid::{decide, HybridParams, JunctionState, PhaseAction, SignalPhase};
pub use plan::SignalPlan;
