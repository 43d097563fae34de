//! Second-by-second phase controller: gap-out extension, a fairness guard and
//! max-pressure selection.
//!
//! Where [`allocate`](super::allocate) plans a whole cycle from demand,
//! [`decide`] runs inside the cycle and answers one question each second:
//! keep the current phase green, or switch. Rules, first match wins:
//!
//! 1. Below `min_green` the phase always holds.
//! 2. While the active phase has a queue, a vehicle arrived within `gap`
//!    seconds, and `max_green` has not been reached, the phase holds.
//! 3. If an approach of the other phase has waited longer than `max_wait`,
//!    switch to it.
//! 4. Otherwise pick the phase with the largest total queue. Ties keep the
//!    current phase.
//!
//! Reaching `max_green` only ends the gap-out extension; rule 4 can still hold
//! a phase that carries the most pressure.

use serde::{Deserialize, Serialize};

use crate::sample::Approach;

/// Controller timings, all in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridParams {
    pub min_green: u32,
    /// Green time after which arrivals no longer extend the phase.
    pub max_green: u32,
    /// Arrival gap that still counts as a continuing platoon.
    pub gap: f32,
    /// Wait beyond which an approach's phase is served ahead of pressure.
    pub max_wait: f32,
    pub yellow: u32,
    pub all_red: u32,
}

impl Default for HybridParams {
    fn default() -> Self {
        Self {
            min_green: 7,
            max_green: 40,
            gap: 3.0,
            max_wait: 90.0,
            yellow: 3,
            all_red: 1,
        }
    }
}

impl HybridParams {
    /// Lost time between the end of one green and the start of the next.
    pub fn clearance_secs(&self) -> u32 {
        self.yellow + self.all_red
    }
}

/// One of the two conflicting movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalPhase {
    NorthSouth,
    EastWest,
}

impl SignalPhase {
    pub const ALL: [SignalPhase; 2] = [SignalPhase::NorthSouth, SignalPhase::EastWest];

    pub fn approaches(&self) -> [Approach; 2] {
        match self {
            SignalPhase::NorthSouth => [Approach::North, Approach::South],
            SignalPhase::EastWest => [Approach::East, Approach::West],
        }
    }

    pub fn of(approach: Approach) -> Self {
        if approach.is_north_south() {
            SignalPhase::NorthSouth
        } else {
            SignalPhase::EastWest
        }
    }

    pub fn other(&self) -> Self {
        match self {
            SignalPhase::NorthSouth => SignalPhase::EastWest,
            SignalPhase::EastWest => SignalPhase::NorthSouth,
        }
    }
}

/// Outcome of one [`decide`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAction {
    Hold,
    Switch(SignalPhase),
}

/// What the controller sees of one approach.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ApproachState {
    /// Vehicles standing at the stop line.
    pub queue: u32,
    /// Longest wait of any queued vehicle, seconds.
    pub max_wait_secs: f32,
    /// Time since the last vehicle arrived, seconds.
    pub secs_since_arrival: f32,
}

/// Junction state indexed by [`Approach::index`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JunctionState {
    pub approaches: [ApproachState; 4],
}

impl JunctionState {
    pub fn approach(&self, approach: Approach) -> &ApproachState {
        &self.approaches[approach.index()]
    }

    pub fn approach_mut(&mut self, approach: Approach) -> &mut ApproachState {
        &mut self.approaches[approach.index()]
    }

    /// Total queue over the phase's approaches.
    pub fn pressure(&self, phase: SignalPhase) -> u64 {
        phase
            .approaches()
            .iter()
            .map(|a| u64::from(self.approach(*a).queue))
            .sum()
    }

    fn has_queue(&self, phase: SignalPhase) -> bool {
        phase.approaches().iter().any(|a| self.approach(*a).queue > 0)
    }

    /// Most recent arrival on any of the phase's approaches.
    fn secs_since_arrival(&self, phase: SignalPhase) -> f32 {
        phase
            .approaches()
            .iter()
            .map(|a| self.approach(*a).secs_since_arrival)
            .fold(f32::INFINITY, f32::min)
    }

    fn is_overdue(&self, phase: SignalPhase, max_wait: f32) -> bool {
        phase
            .approaches()
            .iter()
            .any(|a| self.approach(*a).max_wait_secs > max_wait)
    }
}

/// Decide whether `current` keeps the green after `secs_in_phase` seconds.
pub fn decide(
    params: &HybridParams,
    state: &JunctionState,
    current: SignalPhase,
    secs_in_phase: f32,
) -> PhaseAction {
    if secs_in_phase < params.min_green as f32 {
        return PhaseAction::Hold;
    }

    if state.has_queue(current)
        && state.secs_since_arrival(current) < params.gap
        && secs_in_phase < params.max_green as f32
    {
        return PhaseAction::Hold;
    }

    if let Some(overdue) = SignalPhase::ALL
        .into_iter()
        .find(|phase| *phase != current && state.is_overdue(*phase, params.max_wait))
    {
        return PhaseAction::Switch(overdue);
    }

    let challenger = current.other();
    if state.pressure(challenger) > state.pressure(current) {
        PhaseAction::Switch(challenger)
    } else {
        PhaseAction::Hold
    }
}
