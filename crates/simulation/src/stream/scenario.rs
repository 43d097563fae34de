//! Named demand scenarios.

use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;
use crate::sample::Approach;

/// Bundled recordings that can be replayed instead of synthesizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordedSet {
    MorningPeak,
    EveningClear,
    IncidentEast,
}

impl RecordedSet {
    pub const ALL: [RecordedSet; 3] = [
        RecordedSet::MorningPeak,
        RecordedSet::EveningClear,
        RecordedSet::IncidentEast,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RecordedSet::MorningPeak => "morning-peak",
            RecordedSet::EveningClear => "evening-clear",
            RecordedSet::IncidentEast => "incident-east",
        }
    }

    /// Approach blocked by an incident during the recording, if any.
    pub fn incident_approach(&self) -> Option<Approach> {
        match self {
            RecordedSet::IncidentEast => Some(Approach::East),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|set| set.name() == name)
    }
}

/// Synthesis parameters of a preset scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioPreset {
    /// Base vehicles per tick, indexed by [`Approach::index`].
    pub base_flow: [f32; 4],
    /// Amplitude of the demand wave and of the jitter.
    pub variability: f32,
    /// Approach whose speed collapses because of an incident.
    pub incident: Option<Approach>,
}

/// Demand scenario driving the stream generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    MorningPeak,
    BalancedEvening,
    IncidentEastbound,
    Recorded(RecordedSet),
}

impl Scenario {
    /// Every selectable scenario, presets first.
    pub const ALL: [Scenario; 6] = [
        Scenario::MorningPeak,
        Scenario::BalancedEvening,
        Scenario::IncidentEastbound,
        Scenario::Recorded(RecordedSet::MorningPeak),
        Scenario::Recorded(RecordedSet::EveningClear),
        Scenario::Recorded(RecordedSet::IncidentEast),
    ];

    pub fn tag(&self) -> String {
        match self {
            Scenario::MorningPeak => "morning-peak".to_string(),
            Scenario::BalancedEvening => "balanced-evening".to_string(),
            Scenario::IncidentEastbound => "incident-eastbound".to_string(),
            Scenario::Recorded(set) => format!("recorded:{}", set.name()),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::MorningPeak => {
                "Heavy north/south commuter surge with moderate cross traffic."
            }
            Scenario::BalancedEvening => "Post-rush steady volumes on all legs.",
            Scenario::IncidentEastbound => {
                "Collision eastbound causing spill-back and queue growth."
            }
            Scenario::Recorded(RecordedSet::MorningPeak) => "Replay of a recorded morning peak.",
            Scenario::Recorded(RecordedSet::EveningClear) => {
                "Replay of a recorded clear evening."
            }
            Scenario::Recorded(RecordedSet::IncidentEast) => {
                "Replay of a recorded eastbound incident."
            }
        }
    }

    /// Synthesis parameters; `None` for recorded scenarios.
    pub fn preset(&self) -> Option<ScenarioPreset> {
        match self {
            Scenario::MorningPeak => Some(ScenarioPreset {
                base_flow: [24.0, 28.0, 12.0, 9.0],
                variability: 0.25,
                incident: None,
            }),
            Scenario::BalancedEvening => Some(ScenarioPreset {
                base_flow: [12.0, 14.0, 16.0, 17.0],
                variability: 0.18,
                incident: None,
            }),
            Scenario::IncidentEastbound => Some(ScenarioPreset {
                base_flow: [14.0, 13.0, 34.0, 9.0],
                variability: 0.30,
                incident: Some(Approach::East),
            }),
            Scenario::Recorded(_) => None,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Scenario {
    type Err = PipelineError;

    /// Accepts preset tags, `recorded` (the morning-peak recording) and
    /// `recorded:<set>`. Case and `_`/`-` are not significant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let scenario = match normalized.as_str() {
            "morning-peak" => Some(Scenario::MorningPeak),
            "balanced-evening" => Some(Scenario::BalancedEvening),
            "incident-eastbound" => Some(Scenario::IncidentEastbound),
            "recorded" => Some(Scenario::Recorded(RecordedSet::MorningPeak)),
            other => other
                .strip_prefix("recorded:")
                .and_then(RecordedSet::from_name)
                .map(Scenario::Recorded),
        };
        scenario.ok_or_else(|| PipelineError::InvalidScenario(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for scenario in Scenario::ALL {
            let parsed: Scenario = scenario.tag().parse().expect("tag should parse");
            assert_eq!(parsed, scenario);
        }
    }

    #[test]
    fn test_parse_is_lenient_on_case_and_separator() {
        assert_eq!(
            "Morning_Peak".parse::<Scenario>().ok(),
            Some(Scenario::MorningPeak)
        );
        assert_eq!(
            "recorded".parse::<Scenario>().ok(),
            Some(Scenario::Recorded(RecordedSet::MorningPeak))
        );
    }

    #[test]
    fn test_unknown_tag_is_invalid_scenario() {
        let err = "rush-hour".parse::<Scenario>().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidScenario(ref t) if t == "rush-hour"));
        assert!("recorded:nowhere".parse::<Scenario>().is_err());
    }

    #[test]
    fn test_presets_only_for_synthetic() {
        assert!(Scenario::MorningPeak.preset().is_some());
        assert!(Scenario::Recorded(RecordedSet::EveningClear).preset().is_none());
    }

    #[test]
    fn test_morning_peak_is_north_south_heavy() {
        let preset = Scenario::MorningPeak.preset().unwrap();
        let ns = preset.base_flow[0] + preset.base_flow[1];
        let ew = preset.base_flow[2] + preset.base_flow[3];
        assert!(ns > ew);
    }

    #[test]
    fn test_every_scenario_has_description() {
        for scenario in Scenario::ALL {
            assert!(!scenario.description().is_empty(), "{scenario} has no description");
        }
    }
}
