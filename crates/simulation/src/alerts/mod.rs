//! Alert Engine
//!
//! Raises threshold alerts from a sample and its classification:
//! - **High**: Heavy and total volume above `hard_ceiling`
//! - **Medium**: Heavy at or below the ceiling, or Moderate above
//!   `moderate_volume_threshold`
//! - **Low** (opt-in): Moderate above `advisory_volume`
//!
//! Alerts are deduplicated per (junction, severity) within a cooldown window
//! measured in simulated seconds, so sustained congestion does not flood the
//! log while an escalation to a new severity is still reported at once.

mod active_log;
mod engine;

use serde::{Deserialize, Serialize};

use crate::sample::SampleRef;
use crate::time_of_day::SimTimestamp;

pub use active_log::{ActiveAlertLog, MAX_ACTIVE_ALERTS};
pub use engine::AlertEngine;

/// Alert severity, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    pub const ALL: [AlertSeverity; 3] = [
        AlertSeverity::Low,
        AlertSeverity::Medium,
        AlertSeverity::High,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "Low",
            AlertSeverity::Medium => "Medium",
            AlertSeverity::High => "High",
        }
    }
}

/// A single emitted alert. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique within one engine, increasing in emission order.
    pub id: u64,
    pub timestamp: SimTimestamp,
    pub junction_id: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub source_sample_ref: SampleRef,
}

impl Alert {
    /// Compact form used in tabular exports, e.g. `High: Heavy congestion ...`.
    pub fn summary_line(&self) -> String {
        format!("{}: {}", self.severity.label(), self.message)
    }
}
