//! Rule-based congestion classifier.
//!
//! - Smooth: volume below `low_volume` OR speed above `high_speed`
//! - Heavy: volume above `high_volume` AND speed below `low_speed`
//! - Moderate: everything else
//!
//! Volume thresholds are scaled by `peak_volume_scale` during peak time
//! buckets. Confidence is the normalized margin between the features and the
//! nearest boundary of the predicted level's region.

use crate::config::ClassifierThresholds;

use super::features::FeatureVector;
use super::{CongestionClassifier, CongestionLevel, Prediction};

#[derive(Debug, Clone)]
pub struct ThresholdClassifier {
    thresholds: ClassifierThresholds,
}

impl ThresholdClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Volume thresholds in effect for the given features.
    fn volume_bounds(&self, features: &FeatureVector) -> (f32, f32) {
        let scale = if features.time_bucket.is_peak() {
            self.thresholds.peak_volume_scale
        } else {
            1.0
        };
        (
            self.thresholds.low_volume as f32 * scale,
            self.thresholds.high_volume as f32 * scale,
        )
    }

    pub fn level(&self, features: &FeatureVector) -> CongestionLevel {
        let (low_v, high_v) = self.volume_bounds(features);
        let (v, s) = (features.total_volume, features.average_speed);
        if v < low_v || s > self.thresholds.high_speed {
            CongestionLevel::Smooth
        } else if v > high_v && s < self.thresholds.low_speed {
            CongestionLevel::Heavy
        } else {
            CongestionLevel::Moderate
        }
    }

    /// Margin inside the region of `level`, in units of the threshold band width.
    fn margin(&self, features: &FeatureVector, level: CongestionLevel) -> f32 {
        let (low_v, high_v) = self.volume_bounds(features);
        let (low_s, high_s) = (self.thresholds.low_speed, self.thresholds.high_speed);
        let v_span = (high_v - low_v).max(f32::EPSILON);
        let s_span = (high_s - low_s).max(f32::EPSILON);
        let (v, s) = (features.total_volume, features.average_speed);

        match level {
            // Either condition alone keeps the sample Smooth.
            CongestionLevel::Smooth => ((low_v - v) / v_span).max((s - high_s) / s_span),
            // Both conditions must hold.
            CongestionLevel::Heavy => ((v - high_v) / v_span).min((low_s - s) / s_span),
            CongestionLevel::Moderate => {
                let to_smooth = ((v - low_v) / v_span).min((high_s - s) / s_span);
                let to_heavy = ((high_v - v) / v_span).max((s - low_s) / s_span);
                to_smooth.min(to_heavy)
            }
        }
    }
}

impl CongestionClassifier for ThresholdClassifier {
    fn name(&self) -> &str {
        "threshold"
    }

    fn predict(&self, features: &FeatureVector) -> Prediction {
        let level = self.level(features);
        // Half a band away from the boundary counts as full confidence.
        let confidence = (2.0 * self.margin(features, level)).clamp(0.0, 1.0);
        Prediction { level, confidence }
    }
}
