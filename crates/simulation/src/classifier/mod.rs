//! Congestion classification.
//!
//! A classifier maps a sample's [`FeatureVector`] to a [`CongestionLevel`]
//! with a confidence in [0, 1]. Implementations must be monotonic: more
//! volume never lowers the level and more speed never raises it, all else
//! equal. The rule-based [`ThresholdClassifier`] and the
//! [`EnsembleClassifier`] both satisfy this and are interchangeable behind
//! [`CongestionClassifier`].

pub mod ensemble;
pub mod features;
pub mod threshold;

use serde::{Deserialize, Serialize};

use crate::config::{ClassifierModel, ClassifierThresholds};
use crate::error::PipelineError;
use crate::sample::{Sample, SampleRef};

pub use ensemble::EnsembleClassifier;
pub use features::FeatureVector;
pub use threshold::ThresholdClassifier;

/// Congestion severity, ordered `Smooth < Moderate < Heavy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CongestionLevel {
    Smooth,
    Moderate,
    Heavy,
}

impl CongestionLevel {
    pub fn label(&self) -> &'static str {
        match self {
            CongestionLevel::Smooth => "Smooth",
            CongestionLevel::Moderate => "Moderate",
            CongestionLevel::Heavy => "Heavy",
        }
    }
}

/// Raw output of a classifier before it is tied to a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub level: CongestionLevel,
    pub confidence: f32,
}

/// Classification of one sample. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub sample_ref: SampleRef,
    pub level: CongestionLevel,
    /// Always within [0, 1].
    pub confidence: f32,
}

/// Capability shared by every congestion model.
pub trait CongestionClassifier: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Predict the level for already-validated features.
    fn predict(&self, features: &FeatureVector) -> Prediction;
}

/// Classify `sample` with `classifier`.
///
/// Fails with `FeatureOutOfRange` when the sample cannot produce a valid
/// feature vector (for example a NaN speed).
pub fn classify(
    classifier: &dyn CongestionClassifier,
    sample: &Sample,
) -> Result<ClassificationResult, PipelineError> {
    let features = FeatureVector::from_sample(sample)?;
    let prediction = classifier.predict(&features);
    let confidence = if prediction.confidence.is_finite() {
        prediction.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    Ok(ClassificationResult {
        sample_ref: sample.sample_ref(),
        level: prediction.level,
        confidence,
    })
}

/// Build the classifier selected by configuration.
pub fn build_classifier(
    model: ClassifierModel,
    thresholds: &ClassifierThresholds,
) -> Box<dyn CongestionClassifier> {
    match model {
        ClassifierModel::Threshold => Box::new(ThresholdClassifier::new(thresholds.clone())),
        ClassifierModel::Ensemble => Box::new(EnsembleClassifier::from_thresholds(thresholds)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_of_day::SimTimestamp;

    fn sample(counts: [u32; 4], speed: f32) -> Sample {
        Sample {
            tick: 9,
            timestamp: SimTimestamp(12 * 3600),
            junction_id: "J-2".to_string(),
            counts,
            speeds_kmh: [speed; 4],
            queues: [0; 4],
            scenario_tag: "balanced-evening".to_string(),
        }
    }

    #[test]
    fn test_level_ordering() {
        assert!(CongestionLevel::Smooth < CongestionLevel::Moderate);
        assert!(CongestionLevel::Moderate < CongestionLevel::Heavy);
    }

    #[test]
    fn test_classify_links_sample() {
        let classifier = ThresholdClassifier::new(ClassifierThresholds::default());
        let result = classify(&classifier, &sample([50, 50, 40, 40], 12.0)).unwrap();
        assert_eq!(result.sample_ref.tick, 9);
        assert_eq!(result.sample_ref.junction_id, "J-2");
        assert_eq!(result.level, CongestionLevel::Heavy);
        assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[test]
    fn test_classify_rejects_nan_speed() {
        let classifier = ThresholdClassifier::new(ClassifierThresholds::default());
        let err = classify(&classifier, &sample([10, 10, 10, 10], f32::NAN)).unwrap_err();
        assert!(matches!(err, PipelineError::FeatureOutOfRange { tick: 9, .. }));
    }

    struct Overconfident;

    impl CongestionClassifier for Overconfident {
        fn name(&self) -> &str {
            "overconfident"
        }

        fn predict(&self, _features: &FeatureVector) -> Prediction {
            Prediction {
                level: CongestionLevel::Moderate,
                confidence: 7.5,
            }
        }
    }

    #[test]
    fn test_confidence_is_clamped_for_custom_models() {
        let result = classify(&Overconfident, &sample([1, 1, 1, 1], 40.0)).unwrap();
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_build_classifier_selects_model() {
        let thresholds = ClassifierThresholds::default();
        assert_eq!(
            build_classifier(ClassifierModel::Threshold, &thresholds).name(),
            "threshold"
        );
        assert_eq!(
            build_classifier(ClassifierModel::Ensemble, &thresholds).name(),
            "ensemble"
        );
    }
}
