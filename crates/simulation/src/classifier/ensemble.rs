//! Median-vote ensemble of congestion classifiers.
//!
//! The ensemble predicts the median level of its members. The median of
//! monotonic functions is monotonic, so an ensemble of monotonic members
//! keeps the ordering contract. Confidence is the mean confidence of the
//! members that agree with the median, weighted by their share of the vote.

use crate::config::ClassifierThresholds;

use super::features::FeatureVector;
use super::threshold::ThresholdClassifier;
use super::{CongestionClassifier, CongestionLevel, Prediction};

/// Volume/speed threshold multipliers for the default three-member ensemble:
/// a strict member, the configured thresholds, and a lenient member.
const DEFAULT_MEMBER_SCALES: [(f32, f32); 3] = [(0.9, 1.1), (1.0, 1.0), (1.1, 0.9)];

pub struct EnsembleClassifier {
    members: Vec<Box<dyn CongestionClassifier>>,
}

impl EnsembleClassifier {
    /// Ensemble over arbitrary members. An empty ensemble predicts Moderate
    /// with zero confidence.
    pub fn new(members: Vec<Box<dyn CongestionClassifier>>) -> Self {
        Self { members }
    }

    /// Three threshold members bracketing the configured thresholds.
    pub fn from_thresholds(base: &ClassifierThresholds) -> Self {
        let members = DEFAULT_MEMBER_SCALES
            .iter()
            .map(|&(volume_scale, speed_scale)| {
                let thresholds = ClassifierThresholds {
                    low_volume: (base.low_volume as f32 * volume_scale).round() as u32,
                    high_volume: (base.high_volume as f32 * volume_scale).round() as u32,
                    low_speed: base.low_speed * speed_scale,
                    high_speed: base.high_speed * speed_scale,
                    peak_volume_scale: base.peak_volume_scale,
                };
                Box::new(ThresholdClassifier::new(thresholds)) as Box<dyn CongestionClassifier>
            })
            .collect();
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl CongestionClassifier for EnsembleClassifier {
    fn name(&self) -> &str {
        "ensemble"
    }

    fn predict(&self, features: &FeatureVector) -> Prediction {
        if self.members.is_empty() {
            return Prediction {
                level: CongestionLevel::Moderate,
                confidence: 0.0,
            };
        }

        let votes: Vec<Prediction> = self.members.iter().map(|m| m.predict(features)).collect();
        let mut levels: Vec<CongestionLevel> = votes.iter().map(|p| p.level).collect();
        levels.sort();
        // Lower median for even member counts.
        let level = levels[(levels.len() - 1) / 2];

        let agreeing: Vec<f32> = votes
            .iter()
            .filter(|p| p.level == level)
            .map(|p| p.confidence.clamp(0.0, 1.0))
            .collect();
        let mean = agreeing.iter().sum::<f32>() / agreeing.len() as f32;
        let share = agreeing.len() as f32 / votes.len() as f32;

        Prediction {
            level,
            confidence: (mean * share).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_of_day::TimeBucket;

    fn features(volume: f32, speed: f32) -> FeatureVector {
        FeatureVector {
            total_volume: volume,
            average_speed: speed,
            time_bucket: TimeBucket::Evening,
        }
    }

    struct Fixed(CongestionLevel, f32);

    impl CongestionClassifier for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&self, _features: &FeatureVector) -> Prediction {
            Prediction {
                level: self.0,
                confidence: self.1,
            }
        }
    }

    #[test]
    fn test_median_vote() {
        let ensemble = EnsembleClassifier::new(vec![
            Box::new(Fixed(CongestionLevel::Heavy, 1.0)),
            Box::new(Fixed(CongestionLevel::Smooth, 1.0)),
            Box::new(Fixed(CongestionLevel::Moderate, 0.6)),
        ]);
        let p = ensemble.predict(&features(0.0, 0.0));
        assert_eq!(p.level, CongestionLevel::Moderate);
        // one of three members agrees with confidence 0.6
        assert!((p.confidence - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_unanimous_vote_keeps_confidence() {
        let ensemble = EnsembleClassifier::new(vec![
            Box::new(Fixed(CongestionLevel::Heavy, 0.8)),
            Box::new(Fixed(CongestionLevel::Heavy, 0.4)),
        ]);
        let p = ensemble.predict(&features(0.0, 0.0));
        assert_eq!(p.level, CongestionLevel::Heavy);
        assert!((p.confidence - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_empty_ensemble() {
        let ensemble = EnsembleClassifier::new(Vec::new());
        assert!(ensemble.is_empty());
        let p = ensemble.predict(&features(100.0, 30.0));
        assert_eq!(p.level, CongestionLevel::Moderate);
        assert_eq!(p.confidence, 0.0);
    }

    #[test]
    fn test_default_ensemble_is_monotonic_in_volume() {
        let ensemble = EnsembleClassifier::from_thresholds(&ClassifierThresholds::default());
        assert_eq!(ensemble.len(), 3);
        for speed in [8.0, 20.0, 26.0, 40.0, 52.0, 75.0] {
            let mut prev = CongestionLevel::Smooth;
            for volume in (0..400).map(|v| v as f32) {
                let p = ensemble.predict(&features(volume, speed));
                assert!(p.level >= prev, "dropped at volume {volume} speed {speed}");
                assert!((0.0..=1.0).contains(&p.confidence));
                prev = p.level;
            }
        }
    }

    #[test]
    fn test_default_ensemble_is_monotonic_in_speed() {
        let ensemble = EnsembleClassifier::from_thresholds(&ClassifierThresholds::default());
        for volume in [20.0, 70.0, 130.0, 160.0, 300.0] {
            let mut prev = CongestionLevel::Heavy;
            for speed in (0..100).map(|s| s as f32) {
                let level = ensemble.predict(&features(volume, speed)).level;
                assert!(level <= prev, "rose at speed {speed} volume {volume}");
                prev = level;
            }
        }
    }

    #[test]
    fn test_default_ensemble_agrees_on_clear_cases() {
        let ensemble = EnsembleClassifier::from_thresholds(&ClassifierThresholds::default());
        assert_eq!(ensemble.predict(&features(10.0, 70.0)).level, CongestionLevel::Smooth);
        assert_eq!(ensemble.predict(&features(300.0, 6.0)).level, CongestionLevel::Heavy);
    }
}
