use bevy::prelude::*;

pub mod alerts;
pub mod classifier;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sample;
pub mod session;
pub mod signal;
pub mod sim_rng;
pub mod simulation_sets;
pub mod stream;
pub mod time_of_day;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use alerts::{Alert, AlertSeverity};
pub use classifier::{ClassificationResult, CongestionLevel};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{Pipeline, SharedPipeline};
pub use sample::Sample;
pub use session::{ExportFormat, SessionSummary, TickRecord};
pub use signal::SignalPlan;
pub use simulation_sets::SimulationSet;
pub use stream::Scenario;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global tick counter incremented each FixedUpdate.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// Scenario the plugin feeds to the pipeline on every tick.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveScenario(pub Scenario);

impl Default for ActiveScenario {
    fn default() -> Self {
        Self(Scenario::MorningPeak)
    }
}

/// How often the session summary is logged, in ticks. Zero disables it.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SummaryLogInterval(pub u64);

impl Default for SummaryLogInterval {
    fn default() -> Self {
        Self(60)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Sent after a tick's record has been appended to the session window.
#[derive(Event, Debug, Clone)]
pub struct TickCompleted(pub TickRecord);

/// Sent once per emitted (not suppressed) alert.
#[derive(Event, Debug, Clone)]
pub struct AlertRaised(pub Alert);

/// Sent when a tick fails and is dropped.
#[derive(Event, Debug, Clone)]
pub struct TickDropped {
    pub tick: u64,
    pub error: String,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Runs one pipeline pass per `FixedUpdate`.
///
/// The caller inserts the [`Pipeline`] resource (built from a validated
/// [`PipelineConfig`]); until then the pipeline systems do not run.
pub struct JunctionSimPlugin;

impl Plugin for JunctionSimPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TickCounter>()
            .init_resource::<ActiveScenario>()
            .init_resource::<SummaryLogInterval>()
            .add_event::<TickCompleted>()
            .add_event::<AlertRaised>()
            .add_event::<TickDropped>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::PreSim,
                    SimulationSet::Simulation,
                    SimulationSet::PostSim,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                advance_tick_counter.in_set(SimulationSet::PreSim),
            )
            .add_systems(
                FixedUpdate,
                run_pipeline_tick
                    .run_if(resource_exists::<Pipeline>)
                    .in_set(SimulationSet::Simulation),
            )
            .add_systems(
                FixedUpdate,
                log_session_summary
                    .run_if(resource_exists::<Pipeline>)
                    .in_set(SimulationSet::PostSim),
            );
    }
}

pub fn advance_tick_counter(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

/// One full pipeline pass. Failures are already logged by the pipeline; the
/// schedule keeps running.
pub fn run_pipeline_tick(
    mut pipeline: ResMut<Pipeline>,
    scenario: Res<ActiveScenario>,
    mut completed: EventWriter<TickCompleted>,
    mut raised: EventWriter<AlertRaised>,
    mut dropped: EventWriter<TickDropped>,
) {
    let tick = pipeline.next_tick();
    match pipeline.run_tick(scenario.0) {
        Ok(record) => {
            for alert in &record.alerts {
                raised.send(AlertRaised(alert.clone()));
            }
            completed.send(TickCompleted(record));
        }
        Err(err) => {
            dropped.send(TickDropped {
                tick,
                error: err.to_string(),
            });
        }
    }
}

pub fn log_session_summary(
    tick: Res<TickCounter>,
    interval: Res<SummaryLogInterval>,
    pipeline: Res<Pipeline>,
) {
    if interval.0 == 0 || tick.0 == 0 || tick.0 % interval.0 != 0 {
        return;
    }
    let summary = pipeline.summary();
    let counts = summary.alert_counts;
    info!(
        "Session {}: {} ticks in window, avg volume {:.1}, avg speed {:.1} km/h, \
         heavy {}, delay reduction {:.1}%, alerts H{}/M{}/L{}, dropped {}",
        pipeline.config().junction_id,
        summary.ticks,
        summary.avg_volume,
        summary.avg_speed,
        summary.heavy_ticks,
        summary.avg_delay_reduction_pct,
        counts.high,
        counts.medium,
        counts.low,
        pipeline.dropped_ticks()
    );
}
