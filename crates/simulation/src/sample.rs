//! Per-tick traffic sample produced by the stream generator.

use serde::{Deserialize, Serialize};

use crate::time_of_day::SimTimestamp;

/// One of the four directional flows into the junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Approach {
    North,
    South,
    East,
    West,
}

impl Approach {
    /// Fixed iteration order; per-approach arrays are indexed by it.
    pub const ALL: [Approach; 4] = [
        Approach::North,
        Approach::South,
        Approach::East,
        Approach::West,
    ];

    pub fn index(&self) -> usize {
        match self {
            Approach::North => 0,
            Approach::South => 1,
            Approach::East => 2,
            Approach::West => 3,
        }
    }

    pub fn is_north_south(&self) -> bool {
        matches!(self, Approach::North | Approach::South)
    }
}

/// Identity of a sample, used by derived records to point back at it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRef {
    pub junction_id: String,
    pub tick: u64,
}

/// Counts and speeds observed at one junction during one tick.
///
/// Per-approach arrays are indexed by [`Approach::index`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub tick: u64,
    pub timestamp: SimTimestamp,
    pub junction_id: String,
    /// Vehicles counted per approach during the tick.
    pub counts: [u32; 4],
    /// Mean speed per approach, km/h.
    pub speeds_kmh: [f32; 4],
    /// Estimated standing queue per approach, vehicles.
    pub queues: [u32; 4],
    /// Tag of the scenario that produced the sample.
    pub scenario_tag: String,
}

impl Sample {
    pub fn sample_ref(&self) -> SampleRef {
        SampleRef {
            junction_id: self.junction_id.clone(),
            tick: self.tick,
        }
    }

    pub fn count(&self, approach: Approach) -> u32 {
        self.counts[approach.index()]
    }

    pub fn speed(&self, approach: Approach) -> f32 {
        self.speeds_kmh[approach.index()]
    }

    pub fn total_volume(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Volume-weighted mean speed; plain mean when no vehicles were counted.
    pub fn average_speed(&self) -> f32 {
        let total = self.total_volume();
        if total == 0 {
            return self.speeds_kmh.iter().sum::<f32>() / 4.0;
        }
        let weighted: f32 = self
            .counts
            .iter()
            .zip(self.speeds_kmh.iter())
            .map(|(&c, &s)| c as f32 * s)
            .sum();
        weighted / total as f32
    }

    /// Demand of the North-South phase: counts plus weighted queues.
    pub fn ns_demand(&self, queue_weight: f32) -> f32 {
        self.phase_demand(true, queue_weight)
    }

    /// Demand of the East-West phase: counts plus weighted queues.
    pub fn ew_demand(&self, queue_weight: f32) -> f32 {
        self.phase_demand(false, queue_weight)
    }

    fn phase_demand(&self, north_south: bool, queue_weight: f32) -> f32 {
        Approach::ALL
            .iter()
            .filter(|a| a.is_north_south() == north_south)
            .map(|a| {
                let i = a.index();
                self.counts[i] as f32 + queue_weight * self.queues[i] as f32
            })
            .sum()
    }
}
