use crate::error::PipelineError;
use crate::sample::Sample;
use crate::time_of_day::TimeBucket;

/// Inputs every classifier sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// Sum of the four approach counts.
    pub total_volume: f32,
    /// Volume-weighted mean speed, km/h.
    pub average_speed: f32,
    pub time_bucket: TimeBucket,
}

impl FeatureVector {
    pub fn from_sample(sample: &Sample) -> Result<Self, PipelineError> {
        if let Some(bad) = sample
            .speeds_kmh
            .iter()
            .find(|s| !s.is_finite() || **s < 0.0)
        {
            return Err(PipelineError::FeatureOutOfRange {
                junction_id: sample.junction_id.clone(),
                tick: sample.tick,
                detail: format!("approach speed {bad} km/h is not a non-negative number"),
            });
        }

        Ok(Self {
            total_volume: sample.total_volume() as f32,
            average_speed: sample.average_speed(),
            time_bucket: sample.timestamp.time_bucket(),
        })
    }
}
