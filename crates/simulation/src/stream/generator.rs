//! Synthetic and replayed per-approach samples.
//!
//! Synthetic counts follow a slow demand wave with bounded jitter:
//!
//! `count = base · tod · max(0.2, 1 + var·sin((tick + i)/3) + U(-var/2, var/2))`
//!
//! where `tod` is the time-of-day multiplier of the tick's timestamp. Speeds
//! are a decreasing function of the count (see [`speed_for_count`]).

use std::collections::HashMap;

use crate::config::{PipelineConfig, StreamParams};
use crate::error::PipelineError;
use crate::sample::{Approach, Sample};
use crate::sim_rng::SimRng;
use crate::time_of_day::SimTimestamp;

use super::recorded::RecordedDataset;
use super::scenario::{RecordedSet, Scenario};

pub const MIN_SPEED_KMH: f32 = 5.0;
pub const MAX_SPEED_KMH: f32 = 80.0;

/// Speed on an approach blocked by an incident, as a fraction of normal.
const INCIDENT_SPEED_FACTOR: f32 = 0.3;
/// Floor of the demand-wave factor so an approach never drops to zero by the wave alone.
const MIN_WAVE_FACTOR: f32 = 0.2;
/// Share of the base flow that clears within a tick; the rest queues.
const QUEUE_CLEARANCE_SHARE: f32 = 0.8;

/// Mean speed for an approach carrying `count` vehicles in a tick.
///
/// `speed = free_flow · (1 - (count / capacity)²)`, clamped to
/// [`MIN_SPEED_KMH`, `MAX_SPEED_KMH`]. Non-increasing in `count`.
pub fn speed_for_count(count: u32, params: &StreamParams) -> f32 {
    let ratio = count as f32 / params.approach_capacity.max(1) as f32;
    let multiplier = (1.0 - ratio * ratio).max(0.0);
    (params.free_flow_kmh * multiplier).clamp(MIN_SPEED_KMH, MAX_SPEED_KMH)
}

fn incident_speed(speed: f32) -> f32 {
    (speed * INCIDENT_SPEED_FACTOR).max(MIN_SPEED_KMH)
}

fn queue_estimate(count: u32, base: f32) -> u32 {
    count.saturating_sub((base * QUEUE_CLEARANCE_SHARE) as u32)
}

/// Produces one [`Sample`] per tick for a given scenario.
pub struct StreamGenerator {
    seed: u64,
    junction_id: String,
    start_hour: f32,
    tick_interval_secs: u32,
    params: StreamParams,
    recordings: HashMap<RecordedSet, RecordedDataset>,
}

impl StreamGenerator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            seed: config.seed,
            junction_id: config.junction_id.clone(),
            start_hour: config.start_hour,
            tick_interval_secs: config.tick_interval_secs,
            params: config.stream.clone(),
            recordings: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sample for `tick` under the scenario named by `tag`.
    pub fn next_sample_tagged(&mut self, tag: &str, tick: u64) -> Result<Sample, PipelineError> {
        let scenario: Scenario = tag.parse()?;
        self.next_sample(scenario, tick)
    }

    /// Sample for `tick` under `scenario`.
    ///
    /// Deterministic: the same seed, scenario and tick always give the same sample.
    pub fn next_sample(&mut self, scenario: Scenario, tick: u64) -> Result<Sample, PipelineError> {
        let timestamp = SimTimestamp::for_tick(self.start_hour, self.tick_interval_secs, tick);
        let (counts, queues, incident) = match scenario {
            Scenario::Recorded(set) => {
                let dataset = self.recording(set)?;
                let counts = dataset.cycle(tick);
                let mean = dataset.mean_flow();
                let queues = [0_usize, 1, 2, 3].map(|i| queue_estimate(counts[i], mean[i]));
                (counts, queues, set.incident_approach())
            }
            _ => {
                let preset = scenario
                    .preset()
                    .ok_or_else(|| PipelineError::InvalidScenario(scenario.tag()))?;
                let tod = timestamp.time_bucket().demand_multiplier();
                let mut rng = SimRng::for_tick(self.seed, tick);
                let mut counts = [0_u32; 4];
                let mut queues = [0_u32; 4];
                for approach in Approach::ALL {
                    let i = approach.index();
                    let base = preset.base_flow[i] * tod;
                    let wave = 1.0
                        + preset.variability * ((tick as f32 + i as f32) / 3.0).sin();
                    let noise = rng.jitter(preset.variability / 2.0);
                    let factor = (wave + noise).max(MIN_WAVE_FACTOR);
                    counts[i] = (base * factor).round().max(0.0) as u32;
                    queues[i] = queue_estimate(counts[i], base);
                }
                (counts, queues, preset.incident)
            }
        };

        let mut speeds_kmh = counts.map(|c| speed_for_count(c, &self.params));
        if let Some(approach) = incident {
            let i = approach.index();
            speeds_kmh[i] = incident_speed(speeds_kmh[i]);
        }

        Ok(Sample {
            tick,
            timestamp,
            junction_id: self.junction_id.clone(),
            counts,
            speeds_kmh,
            queues,
            scenario_tag: scenario.tag(),
        })
    }

    fn recording(&mut self, set: RecordedSet) -> Result<&RecordedDataset, PipelineError> {
        if !self.recordings.contains_key(&set) {
            let dataset = RecordedDataset::load(set)?;
            self.recordings.insert(set, dataset);
        }
        self.recordings
            .get(&set)
            .ok_or_else(|| PipelineError::InvalidRecording {
                name: set.name().to_string(),
                reason: "recording not loaded".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(seed: u64) -> StreamGenerator {
        StreamGenerator::new(&PipelineConfig {
            seed,
            ..Default::default()
        })
    }

    #[test]
    fn test_speed_for_count_bounds() {
        let params = StreamParams::default();
        assert!((speed_for_count(0, &params) - MAX_SPEED_KMH).abs() < f32::EPSILON);
        assert!((speed_for_count(10_000, &params) - MIN_SPEED_KMH).abs() < f32::EPSILON);
    }

    #[test]
    fn test_speed_for_count_monotonically_decreasing() {
        let params = StreamParams::default();
        let mut prev = speed_for_count(0, &params);
        for count in 1..120 {
            let speed = speed_for_count(count, &params);
            assert!(
                speed <= prev,
                "speed should not rise with count: {} -> {} at count {}",
                prev,
                speed,
                count
            );
            assert!((MIN_SPEED_KMH..=MAX_SPEED_KMH).contains(&speed));
            prev = speed;
        }
    }

    #[test]
    fn test_same_seed_same_samples() {
        let mut a = generator(7);
        let mut b = generator(7);
        for tick in 0..50 {
            let sa = a.next_sample(Scenario::MorningPeak, tick).unwrap();
            let sb = b.next_sample(Scenario::MorningPeak, tick).unwrap();
            assert_eq!(sa, sb, "tick {tick} differs");
        }
    }

    #[test]
    fn test_different_seeds_differ_somewhere() {
        let mut a = generator(1);
        let mut b = generator(2);
        let differs = (0..20).any(|tick| {
            a.next_sample(Scenario::BalancedEvening, tick).unwrap().counts
                != b.next_sample(Scenario::BalancedEvening, tick).unwrap().counts
        });
        assert!(differs);
    }

    #[test]
    fn test_sample_metadata() {
        let mut stream = generator(42);
        let sample = stream.next_sample(Scenario::IncidentEastbound, 4).unwrap();
        assert_eq!(sample.tick, 4);
        assert_eq!(sample.junction_id, "J-001");
        assert_eq!(sample.scenario_tag, "incident-eastbound");
        assert_eq!(sample.timestamp, SimTimestamp::for_tick(7.0, 5, 4));
    }

    #[test]
    fn test_speeds_within_bounds_for_all_scenarios() {
        let mut stream = generator(11);
        for scenario in Scenario::ALL {
            for tick in 0..60 {
                let sample = stream.next_sample(scenario, tick).unwrap();
                for speed in sample.speeds_kmh {
                    assert!(
                        (MIN_SPEED_KMH..=MAX_SPEED_KMH).contains(&speed),
                        "{scenario} tick {tick}: speed {speed} out of range"
                    );
                }
            }
        }
    }

    #[test]
    fn test_incident_slows_eastbound() {
        let mut stream = generator(5);
        for tick in 0..20 {
            let sample = stream.next_sample(Scenario::IncidentEastbound, tick).unwrap();
            let free = speed_for_count(sample.count(Approach::East), &StreamParams::default());
            assert!(sample.speed(Approach::East) <= free);
            let expected = incident_speed(free);
            assert!((sample.speed(Approach::East) - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_recorded_replays_dataset() {
        let mut stream = generator(99);
        let dataset = RecordedDataset::load(RecordedSet::EveningClear).unwrap();
        for tick in 0..30 {
            let sample = stream
                .next_sample(Scenario::Recorded(RecordedSet::EveningClear), tick)
                .unwrap();
            assert_eq!(sample.counts, dataset.cycle(tick));
        }
    }

    #[test]
    fn test_recorded_ignores_seed() {
        let mut a = generator(1);
        let mut b = generator(2);
        let scenario = Scenario::Recorded(RecordedSet::MorningPeak);
        assert_eq!(
            a.next_sample(scenario, 5).unwrap(),
            b.next_sample(scenario, 5).unwrap()
        );
    }

    #[test]
    fn test_unknown_tag_fails() {
        let mut stream = generator(0);
        let err = stream.next_sample_tagged("gridlock-sunday", 0).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidScenario(_)));
        assert!(stream.next_sample_tagged("morning-peak", 0).is_ok());
    }

    #[test]
    fn test_night_demand_is_lower_than_peak() {
        let mut peak = StreamGenerator::new(&PipelineConfig {
            start_hour: 8.0,
            ..Default::default()
        });
        let mut night = StreamGenerator::new(&PipelineConfig {
            start_hour: 2.0,
            ..Default::default()
        });
        let peak_total: u32 = (0..30)
            .map(|t| peak.next_sample(Scenario::BalancedEvening, t).unwrap().total_volume())
            .sum();
        let night_total: u32 = (0..30)
            .map(|t| night.next_sample(Scenario::BalancedEvening, t).unwrap().total_volume())
            .sum();
        assert!(peak_total > night_total);
    }
}
