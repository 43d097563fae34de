//! Pipeline configuration.
//!
//! Every tunable the pipeline reads lives in a single [`PipelineConfig`]
//! resource that is passed explicitly into the generator, classifier,
//! allocator and alert engine. Nothing reads module-level constants for
//! thresholds, so one process can drive several junctions with different
//! tunings side by side.
//!
//! All fields carry serde defaults, so a partial JSON document such as
//! `{"seed": 7, "signal": {"cycle_length": 120}}` is a valid configuration.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Signal timing parameters
// ---------------------------------------------------------------------------

/// Two-phase signal cycle bounds, all in whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// Total cycle length including lost time.
    pub cycle_length: u32,
    /// Lost time per cycle (yellow + all-red for both phases).
    pub fixed_overhead: u32,
    /// Lower bound for either phase's green time.
    pub min_green: u32,
    /// Upper bound for either phase's green time.
    pub max_green: u32,
    /// Largest change in a phase's green time between consecutive plans.
    pub max_delta_per_tick: u32,
    /// Weight applied to estimated queues when forming phase demand.
    pub queue_weight: f32,
    /// Blend between the proportional split (1.0) and an even split (0.0).
    pub responsiveness: f32,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            cycle_length: 90,
            fixed_overhead: 10,
            min_green: 10,
            max_green: 60,
            max_delta_per_tick: 8,
            queue_weight: 0.5,
            responsiveness: 1.0,
        }
    }
}

impl SignalParams {
    /// Green time available to the two phases.
    ///
    /// Callers must have validated `cycle_length > fixed_overhead`.
    pub fn green_budget(&self) -> u32 {
        self.cycle_length.saturating_sub(self.fixed_overhead)
    }

    /// Whether the budget can be split without leaving a deviation.
    pub fn budget_is_feasible(&self) -> bool {
        let budget = u64::from(self.green_budget());
        budget >= 2 * u64::from(self.min_green) && budget <= 2 * u64::from(self.max_green)
    }
}

// ---------------------------------------------------------------------------
// Classifier thresholds
// ---------------------------------------------------------------------------

/// Volume is vehicles per tick summed over the four approaches; speeds are km/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub low_volume: u32,
    pub high_volume: u32,
    pub low_speed: f32,
    pub high_speed: f32,
    /// Volume thresholds are multiplied by this during peak time buckets.
    pub peak_volume_scale: f32,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            low_volume: 60,
            high_volume: 140,
            low_speed: 25.0,
            high_speed: 50.0,
            peak_volume_scale: 1.1,
        }
    }
}

/// Which congestion model the pipeline builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierModel {
    #[default]
    Threshold,
    Ensemble,
}

// ---------------------------------------------------------------------------
// Alert thresholds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertParams {
    /// Heavy samples above this total volume raise a High alert.
    pub hard_ceiling: u32,
    /// Moderate samples above this total volume raise a Medium alert.
    pub moderate_volume_threshold: u32,
    /// Moderate samples above this volume raise a Low advisory. `None` disables advisories.
    pub advisory_volume: Option<u32>,
    /// Minimum simulated seconds between two alerts with the same
    /// (junction, severity). `None` means three tick intervals.
    pub cooldown_secs: Option<u32>,
}

impl Default for AlertParams {
    fn default() -> Self {
        Self {
            hard_ceiling: 180,
            moderate_volume_threshold: 110,
            advisory_volume: None,
            cooldown_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Stream generator parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamParams {
    /// Vehicles per tick at which a single approach is saturated.
    pub approach_capacity: u32,
    /// Mean speed on an empty approach, km/h.
    pub free_flow_kmh: f32,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            approach_capacity: 45,
            free_flow_kmh: 80.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineConfig resource
// ---------------------------------------------------------------------------

/// Complete configuration surface of the pipeline.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub junction_id: String,
    /// Seed for the synthetic stream. Identical seeds give identical samples.
    pub seed: u64,
    /// Simulated seconds between two ticks.
    pub tick_interval_secs: u32,
    /// Hour of day (0.0..24.0) at tick 0.
    pub start_hour: f32,
    /// Maximum number of tick records held by the session window.
    pub window_capacity: usize,
    pub signal: SignalParams,
    pub classifier_model: ClassifierModel,
    pub classifier: ClassifierThresholds,
    pub alerts: AlertParams,
    pub stream: StreamParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            junction_id: "J-001".to_string(),
            seed: crate::sim_rng::DEFAULT_SEED,
            tick_interval_secs: 5,
            start_hour: 7.0,
            window_capacity: 500,
            signal: SignalParams::default(),
            classifier_model: ClassifierModel::default(),
            classifier: ClassifierThresholds::default(),
            alerts: AlertParams::default(),
            stream: StreamParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Effective alert cooldown in simulated seconds.
    pub fn alert_cooldown_secs(&self) -> u64 {
        self.alerts
            .cooldown_secs
            .map(u64::from)
            .unwrap_or(3 * u64::from(self.tick_interval_secs))
    }

    /// Check the configuration for internal consistency.
    ///
    /// Called once when a pipeline is built, never mid-tick.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let s = &self.signal;
        if s.min_green > s.max_green {
            return Err(invalid(format!(
                "min_green ({}) exceeds max_green ({})",
                s.min_green, s.max_green
            )));
        }
        if s.cycle_length <= s.fixed_overhead {
            return Err(invalid(format!(
                "cycle_length ({}) must exceed fixed_overhead ({})",
                s.cycle_length, s.fixed_overhead
            )));
        }
        if !(0.0..=1.0).contains(&s.responsiveness) {
            return Err(invalid(format!(
                "responsiveness ({}) must lie in [0, 1]",
                s.responsiveness
            )));
        }
        if !s.queue_weight.is_finite() || s.queue_weight < 0.0 {
            return Err(invalid(format!(
                "queue_weight ({}) must be a non-negative number",
                s.queue_weight
            )));
        }

        let c = &self.classifier;
        if c.low_volume >= c.high_volume {
            return Err(invalid(format!(
                "classifier low_volume ({}) must be below high_volume ({})",
                c.low_volume, c.high_volume
            )));
        }
        if !c.low_speed.is_finite() || !c.high_speed.is_finite() || c.low_speed < 0.0 {
            return Err(invalid("classifier speed thresholds must be finite and non-negative"));
        }
        if c.low_speed >= c.high_speed {
            return Err(invalid(format!(
                "classifier low_speed ({}) must be below high_speed ({})",
                c.low_speed, c.high_speed
            )));
        }
        if !c.peak_volume_scale.is_finite() || c.peak_volume_scale <= 0.0 {
            return Err(invalid(format!(
                "peak_volume_scale ({}) must be positive",
                c.peak_volume_scale
            )));
        }

        let a = &self.alerts;
        if a.moderate_volume_threshold > a.hard_ceiling {
            return Err(invalid(format!(
                "moderate_volume_threshold ({}) exceeds hard_ceiling ({})",
                a.moderate_volume_threshold, a.hard_ceiling
            )));
        }

        if self.window_capacity == 0 {
            return Err(invalid("window_capacity must be at least 1"));
        }
        if self.tick_interval_secs == 0 {
            return Err(invalid("tick_interval_secs must be at least 1"));
        }
        if !(0.0..24.0).contains(&self.start_hour) {
            return Err(invalid(format!(
                "start_hour ({}) must lie in [0, 24)",
                self.start_hour
            )));
        }
        if self.stream.approach_capacity == 0 {
            return Err(invalid("stream approach_capacity must be at least 1"));
        }
        if !self.stream.free_flow_kmh.is_finite() || self.stream.free_flow_kmh <= 0.0 {
            return Err(invalid("stream free_flow_kmh must be positive"));
        }

        if !s.budget_is_feasible() {
            warn!(
                "PipelineConfig: green budget {}s cannot be split within [{}, {}]s per phase; \
                 plans will carry an explicit deviation",
                s.green_budget(),
                s.min_green,
                s.max_green
            );
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> PipelineError {
    PipelineError::InvalidConfig(msg.into())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
