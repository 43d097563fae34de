use std::collections::HashMap;

use bevy::prelude::*;

use crate::classifier::{ClassificationResult, CongestionLevel};
use crate::config::{AlertParams, PipelineConfig};
use crate::sample::Sample;
use crate::time_of_day::SimTimestamp;

use super::{ActiveAlertLog, Alert, AlertSeverity};

/// Threshold evaluation with per-(junction, severity) cooldown.
#[derive(Debug, Clone)]
pub struct AlertEngine {
    params: AlertParams,
    cooldown_secs: u64,
    next_id: u64,
    /// Timestamp of the last emitted alert per (junction, severity).
    last_emitted: HashMap<(String, AlertSeverity), SimTimestamp>,
    active: ActiveAlertLog,
}

impl AlertEngine {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            params: config.alerts.clone(),
            cooldown_secs: config.alert_cooldown_secs(),
            next_id: 1,
            last_emitted: HashMap::new(),
            active: ActiveAlertLog::default(),
        }
    }

    pub fn cooldown_secs(&self) -> u64 {
        self.cooldown_secs
    }

    /// Severity the thresholds assign to this sample, before deduplication.
    pub fn severity_for(
        &self,
        sample: &Sample,
        classification: &ClassificationResult,
    ) -> Option<AlertSeverity> {
        let volume = sample.total_volume();
        match classification.level {
            CongestionLevel::Heavy if volume > self.params.hard_ceiling => Some(AlertSeverity::High),
            CongestionLevel::Heavy => Some(AlertSeverity::Medium),
            CongestionLevel::Moderate if volume > self.params.moderate_volume_threshold => {
                Some(AlertSeverity::Medium)
            }
            CongestionLevel::Moderate => match self.params.advisory_volume {
                Some(advisory) if volume > advisory => Some(AlertSeverity::Low),
                _ => None,
            },
            CongestionLevel::Smooth => None,
        }
    }

    /// Evaluate one sample. Returns the alerts emitted for it (zero or one).
    pub fn evaluate(&mut self, sample: &Sample, classification: &ClassificationResult) -> Vec<Alert> {
        let Some(severity) = self.severity_for(sample, classification) else {
            return Vec::new();
        };

        let key = (sample.junction_id.clone(), severity);
        if let Some(&last) = self.last_emitted.get(&key) {
            let elapsed = sample.timestamp.secs_since(last);
            if elapsed < self.cooldown_secs {
                debug!(
                    "AlertEngine: suppressed {} alert at {} tick {} ({}s since last, cooldown {}s)",
                    severity.label(),
                    sample.junction_id,
                    sample.tick,
                    elapsed,
                    self.cooldown_secs
                );
                return Vec::new();
            }
        }

        let alert = Alert {
            id: self.next_id,
            timestamp: sample.timestamp,
            junction_id: sample.junction_id.clone(),
            severity,
            message: self.message(severity, sample, classification),
            source_sample_ref: sample.sample_ref(),
        };
        self.next_id += 1;
        self.last_emitted.insert(key, sample.timestamp);

        match severity {
            AlertSeverity::High => warn!(
                "[{}] High alert #{} at {}: {}",
                alert.timestamp.formatted(),
                alert.id,
                alert.junction_id,
                alert.message
            ),
            _ => info!(
                "[{}] {} alert #{} at {}: {}",
                alert.timestamp.formatted(),
                severity.label(),
                alert.id,
                alert.junction_id,
                alert.message
            ),
        }

        self.active.push(alert.clone());
        vec![alert]
    }

    fn message(
        &self,
        severity: AlertSeverity,
        sample: &Sample,
        classification: &ClassificationResult,
    ) -> String {
        let volume = sample.total_volume();
        let speed = sample.average_speed();
        match severity {
            AlertSeverity::High => format!(
                "Heavy congestion: {volume} vehicles above ceiling {}, avg speed {speed:.1} km/h",
                self.params.hard_ceiling
            ),
            AlertSeverity::Medium if classification.level == CongestionLevel::Heavy => format!(
                "Heavy congestion: {volume} vehicles, avg speed {speed:.1} km/h"
            ),
            AlertSeverity::Medium => format!(
                "Building congestion: {volume} vehicles above {}, avg speed {speed:.1} km/h",
                self.params.moderate_volume_threshold
            ),
            AlertSeverity::Low => format!(
                "Advisory: {volume} vehicles, avg speed {speed:.1} km/h"
            ),
        }
    }

    /// Alerts raised since the last clear.
    pub fn active(&self) -> &ActiveAlertLog {
        &self.active
    }

    /// Drop active alerts and forget cooldown state. Alert ids keep increasing.
    pub fn clear(&mut self) {
        let dropped = self.active.len();
        self.active.clear();
        self.last_emitted.clear();
        info!("AlertEngine: cleared {} active alerts", dropped);
    }
}
