// ---------------------------------------------------------------------------
// PipelineError: typed errors for pipeline construction and tick evaluation
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors raised by the junction pipeline.
///
/// Configuration problems (`InvalidConfig`, `ConfigIo`, `ConfigParse`) surface
/// when a `Pipeline` is built. `FeatureOutOfRange` and `InvalidRecording` can
/// occur inside a tick; the pipeline catches them at the tick boundary, logs
/// them and drops the tick.
#[derive(Debug)]
pub enum PipelineError {
    /// Unknown scenario tag (not one of the presets or a bundled recording).
    InvalidScenario(String),
    /// Inconsistent thresholds or cycle bounds.
    InvalidConfig(String),
    /// A bundled recording could not be decoded or is empty.
    InvalidRecording { name: String, reason: String },
    /// A classifier or allocator input fell outside its valid domain.
    FeatureOutOfRange {
        junction_id: String,
        tick: u64,
        detail: String,
    },
    /// Phase demand handed to the allocator was negative or not a number.
    InvalidDemand { ns_demand: f32, ew_demand: f32 },
    /// Reading a configuration file failed.
    ConfigIo(std::io::Error),
    /// A configuration document was not valid JSON for `PipelineConfig`.
    ConfigParse(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidScenario(tag) => write!(f, "Invalid scenario: '{tag}'"),
            PipelineError::InvalidConfig(msg) => write!(f, "Invalid config: {msg}"),
            PipelineError::InvalidRecording { name, reason } => {
                write!(f, "Invalid recording '{name}': {reason}")
            }
            PipelineError::FeatureOutOfRange {
                junction_id,
                tick,
                detail,
            } => write!(
                f,
                "Feature out of range at junction {junction_id}, tick {tick}: {detail}"
            ),
            PipelineError::InvalidDemand {
                ns_demand,
                ew_demand,
            } => write!(
                f,
                "Invalid phase demand: ns={ns_demand}, ew={ew_demand} (must be finite and non-negative)"
            ),
            PipelineError::ConfigIo(e) => write!(f, "Config I/O error: {e}"),
            PipelineError::ConfigParse(msg) => write!(f, "Config parse error: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::ConfigIo(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::ConfigIo(e)
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::ConfigParse(e.to_string())
    }
}

impl PipelineError {
    /// True for errors that belong to a single tick rather than to the setup.
    pub fn is_tick_local(&self) -> bool {
        matches!(
            self,
            PipelineError::FeatureOutOfRange { .. }
                | PipelineError::InvalidDemand { .. }
                | PipelineError::InvalidRecording { .. }
        )
    }
}
