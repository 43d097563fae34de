use serde::{Deserialize, Serialize};

/// Green split for one two-phase cycle. Recomputed every tick; never mutated.
///
/// Invariant: `ns_green + ew_green + fixed_overhead + deviation_secs == cycle_length`,
/// and `deviation_secs` is zero whenever the configuration admits an exact split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPlan {
    pub cycle_length: u32,
    pub fixed_overhead: u32,
    pub ns_green: u32,
    pub ew_green: u32,
    pub min_green: u32,
    pub max_green: u32,
    /// Seconds of the green budget left unassigned (negative: over-assigned)
    /// because both phases are pinned at their bounds.
    pub deviation_secs: i32,
    /// North-South share of demand the split was derived from.
    pub demand_ratio: f32,
    /// Expected per-vehicle wait improvement over an even split, percent.
    pub estimated_delay_reduction_pct: f32,
    /// Whether the change from the prior plan was capped.
    pub rate_limited: bool,
    /// Human-readable summary of the decision.
    pub reason: String,
}

impl SignalPlan {
    pub fn green_budget(&self) -> u32 {
        self.cycle_length.saturating_sub(self.fixed_overhead)
    }

    /// Seconds accounted for by the plan, deviation included.
    pub fn accounted_secs(&self) -> i64 {
        i64::from(self.ns_green)
            + i64::from(self.ew_green)
            + i64::from(self.fixed_overhead)
            + i64::from(self.deviation_secs)
    }

    /// Both phases within bounds and the cycle fully accounted for.
    pub fn is_consistent(&self) -> bool {
        let bounds = self.min_green..=self.max_green;
        bounds.contains(&self.ns_green)
            && bounds.contains(&self.ew_green)
            && self.accounted_secs() == i64::from(self.cycle_length)
    }

    /// True when the phases exactly fill the cycle.
    pub fn is_exact(&self) -> bool {
        self.deviation_secs == 0
    }
}
