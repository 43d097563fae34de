//! # TestJunction: headless integration test harness
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins` + `JunctionSimPlugin` and a
//! ready pipeline, so tests can drive ticks through the real schedule and
//! inspect the resulting resources and events.

use bevy::app::App;
use bevy::prelude::*;

use crate::config::PipelineConfig;
use crate::pipeline::Pipeline;
use crate::session::SessionSummary;
use crate::stream::Scenario;
use crate::{ActiveScenario, JunctionSimPlugin, SummaryLogInterval, TickCounter};

/// A headless Bevy App wrapping `JunctionSimPlugin` for integration testing.
pub struct TestJunction {
    app: App,
}

impl Default for TestJunction {
    fn default() -> Self {
        Self::new()
    }
}

impl TestJunction {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Junction with the default configuration and the morning-peak scenario.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Junction with a custom configuration. Panics if it does not validate.
    pub fn with_config(config: PipelineConfig) -> Self {
        let pipeline = Pipeline::new(config).expect("test configuration must be valid");
        Self::with_pipeline(pipeline)
    }

    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(JunctionSimPlugin);
        app.insert_resource(pipeline);
        // Run one update so Startup systems execute.
        app.update();
        Self { app }
    }

    /// Junction without a pipeline resource; the pipeline systems stay idle.
    pub fn without_pipeline() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(JunctionSimPlugin);
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Setup (builder pattern, consumes and returns Self)
    // -----------------------------------------------------------------------

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.app.insert_resource(ActiveScenario(scenario));
        self
    }

    pub fn with_summary_interval(mut self, ticks: u64) -> Self {
        self.app.insert_resource(SummaryLogInterval(ticks));
        self
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run the FixedUpdate schedule `n` times.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    /// Switch the scenario between ticks.
    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.app.insert_resource(ActiveScenario(scenario));
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn pipeline(&self) -> &Pipeline {
        self.resource::<Pipeline>()
    }

    pub fn pipeline_mut(&mut self) -> Mut<'_, Pipeline> {
        self.app.world_mut().resource_mut::<Pipeline>()
    }

    pub fn tick_count(&self) -> u64 {
        self.resource::<TickCounter>().0
    }

    pub fn summary(&self) -> SessionSummary {
        self.pipeline().summary()
    }

    /// Take every pending event of type `E`, oldest first.
    pub fn drain_events<E: Event + Clone>(&mut self) -> Vec<E> {
        self.app
            .world_mut()
            .resource_mut::<Events<E>>()
            .drain()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_window_len(&self, expected: usize) {
        let len = self.pipeline().window().len();
        assert_eq!(len, expected, "Expected {expected} records in window, got {len}");
    }

    /// Assert every recorded plan fills its cycle within bounds.
    pub fn assert_plans_consistent(&self) {
        for record in self.pipeline().window().records() {
            assert!(
                record.plan.is_consistent(),
                "Inconsistent plan at tick {}: {:?}",
                record.sample.tick,
                record.plan
            );
        }
    }
}
