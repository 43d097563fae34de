//! Bundled recordings replayed by the `recorded` scenarios.
//!
//! The JSON documents are compiled into the crate so replay never touches
//! the filesystem during a tick.

use serde::Deserialize;

use super::scenario::RecordedSet;
use crate::error::PipelineError;

const MORNING_PEAK_JSON: &str = include_str!("../../assets/recorded/morning_peak.json");
const EVENING_CLEAR_JSON: &str = include_str!("../../assets/recorded/evening_clear.json");
const INCIDENT_EAST_JSON: &str = include_str!("../../assets/recorded/incident_east.json");

/// A decoded recording: one row of per-approach counts per cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordedDataset {
    pub name: String,
    pub description: String,
    /// Counts per cycle, ordered north, south, east, west.
    pub cycles: Vec<[u32; 4]>,
}

impl RecordedDataset {
    pub fn load(set: RecordedSet) -> Result<Self, PipelineError> {
        let raw = match set {
            RecordedSet::MorningPeak => MORNING_PEAK_JSON,
            RecordedSet::EveningClear => EVENING_CLEAR_JSON,
            RecordedSet::IncidentEast => INCIDENT_EAST_JSON,
        };
        let dataset: RecordedDataset =
            serde_json::from_str(raw).map_err(|e| PipelineError::InvalidRecording {
                name: set.name().to_string(),
                reason: e.to_string(),
            })?;
        if dataset.cycles.is_empty() {
            return Err(PipelineError::InvalidRecording {
                name: set.name().to_string(),
                reason: "recording has no cycles".to_string(),
            });
        }
        Ok(dataset)
    }

    /// Row replayed at `tick`; the recording loops.
    pub fn cycle(&self, tick: u64) -> [u32; 4] {
        let idx = (tick % self.cycles.len() as u64) as usize;
        self.cycles[idx]
    }

    /// Mean count per approach over the whole recording.
    pub fn mean_flow(&self) -> [f32; 4] {
        let mut sums = [0.0_f32; 4];
        for row in &self.cycles {
            for (sum, &count) in sums.iter_mut().zip(row.iter()) {
                *sum += count as f32;
            }
        }
        let n = self.cycles.len().max(1) as f32;
        sums.map(|s| s / n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_bundled_recordings_decode() {
        for set in RecordedSet::ALL {
            let dataset = RecordedDataset::load(set).expect("bundled recording should decode");
            assert_eq!(dataset.name, set.name());
            assert!(!dataset.cycles.is_empty());
            assert!(!dataset.description.is_empty());
        }
    }

    #[test]
    fn test_cycle_wraps() {
        let dataset = RecordedDataset::load(RecordedSet::EveningClear).unwrap();
        let len = dataset.cycles.len() as u64;
        assert_eq!(dataset.cycle(0), dataset.cycle(len));
        assert_eq!(dataset.cycle(3), dataset.cycle(2 * len + 3));
    }

    #[test]
    fn test_incident_recording_is_east_heavy() {
        let dataset = RecordedDataset::load(RecordedSet::IncidentEast).unwrap();
        let mean = dataset.mean_flow();
        assert!(mean[2] > mean[0] && mean[2] > mean[1] && mean[2] > mean[3]);
    }
}
