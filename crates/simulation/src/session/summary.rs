use serde::{Deserialize, Serialize};

use crate::alerts::AlertSeverity;
use crate::classifier::CongestionLevel;

use super::TickRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl AlertCounts {
    pub fn get(&self, severity: AlertSeverity) -> usize {
        match severity {
            AlertSeverity::Low => self.low,
            AlertSeverity::Medium => self.medium,
            AlertSeverity::High => self.high,
        }
    }

    pub fn add(&mut self, severity: AlertSeverity) {
        match severity {
            AlertSeverity::Low => self.low += 1,
            AlertSeverity::Medium => self.medium += 1,
            AlertSeverity::High => self.high += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

/// Aggregates over the records currently in the window.
///
/// An empty window yields the zeroed default, for which `is_empty()` holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub ticks: usize,
    /// Mean total volume per tick.
    pub avg_volume: f32,
    /// Mean of the per-tick volume-weighted speeds, km/h.
    pub avg_speed: f32,
    pub avg_delay_reduction_pct: f32,
    pub heavy_ticks: usize,
    pub alert_counts: AlertCounts,
}

impl SessionSummary {
    pub fn from_records<'a>(records: impl Iterator<Item = &'a TickRecord>) -> Self {
        let mut summary = SessionSummary::default();
        let mut volume = 0.0_f64;
        let mut speed = 0.0_f64;
        let mut delay = 0.0_f64;

        for record in records {
            summary.ticks += 1;
            volume += f64::from(record.sample.total_volume());
            speed += f64::from(record.sample.average_speed());
            delay += f64::from(record.plan.estimated_delay_reduction_pct);
            if record.classification.level == CongestionLevel::Heavy {
                summary.heavy_ticks += 1;
            }
            for alert in &record.alerts {
                summary.alert_counts.add(alert.severity);
            }
        }

        if summary.ticks > 0 {
            let n = summary.ticks as f64;
            summary.avg_volume = (volume / n) as f32;
            summary.avg_speed = (speed / n) as f32;
            summary.avg_delay_reduction_pct = (delay / n) as f32;
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.ticks == 0
    }
}
