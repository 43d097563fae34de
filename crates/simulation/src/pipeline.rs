//! One pipeline pass per tick: generate, classify, allocate, alert, record.
//!
//! A tick is atomic. Every output is built before anything is written to
//! the session window, and a tick that fails part-way leaves the window,
//! the prior plan and the alert cooldowns exactly as they were.

use std::sync::{Arc, Mutex, MutexGuard};

use bevy::prelude::*;

use crate::alerts::{ActiveAlertLog, AlertEngine};
use crate::classifier::{self, build_classifier, CongestionClassifier};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::session::{ExportFormat, SessionSummary, SessionWindow, TickRecord};
use crate::signal::{self, SignalPlan};
use crate::stream::{Scenario, StreamGenerator};

/// The complete junction pipeline and the state it carries between ticks.
#[derive(Resource)]
pub struct Pipeline {
    config: PipelineConfig,
    generator: StreamGenerator,
    classifier: Box<dyn CongestionClassifier>,
    alerts: AlertEngine,
    window: SessionWindow,
    prior_plan: Option<SignalPlan>,
    next_tick: u64,
    dropped_ticks: u64,
}

impl Pipeline {
    /// Validate `config` and build a pipeline with the configured classifier.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let classifier = build_classifier(config.classifier_model, &config.classifier);
        Self::with_classifier(config, classifier)
    }

    /// Build a pipeline around a caller-supplied classifier.
    pub fn with_classifier(
        config: PipelineConfig,
        classifier: Box<dyn CongestionClassifier>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        info!(
            "Pipeline: junction {} seed {} window capacity {} classifier {} tick {}s",
            config.junction_id,
            config.seed,
            config.window_capacity,
            classifier.name(),
            config.tick_interval_secs
        );
        Ok(Self {
            generator: StreamGenerator::new(&config),
            alerts: AlertEngine::new(&config),
            window: SessionWindow::new(config.window_capacity),
            classifier,
            config,
            prior_plan: None,
            next_tick: 0,
            dropped_ticks: 0,
        })
    }

    /// Run one full pass for the next tick index.
    ///
    /// On success the record is appended to the window and returned. On
    /// failure the tick is logged and dropped; the tick index still advances
    /// so later samples keep their timestamps.
    pub fn run_tick(&mut self, scenario: Scenario) -> Result<TickRecord, PipelineError> {
        let tick = self.next_tick;
        self.next_tick += 1;

        match self.evaluate_tick(scenario, tick) {
            Ok(record) => {
                self.prior_plan = Some(record.plan.clone());
                self.window.push(record.clone());
                Ok(record)
            }
            Err(err) => {
                self.dropped_ticks += 1;
                warn!(
                    "Pipeline: dropped tick {} at junction {} ({}): {}",
                    tick,
                    self.config.junction_id,
                    scenario.tag(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Parse `tag` as a scenario and run one tick with it.
    pub fn run_tick_tagged(&mut self, tag: &str) -> Result<TickRecord, PipelineError> {
        let scenario: Scenario = tag.parse()?;
        self.run_tick(scenario)
    }

    fn evaluate_tick(&mut self, scenario: Scenario, tick: u64) -> Result<TickRecord, PipelineError> {
        let sample = self.generator.next_sample(scenario, tick)?;
        let classification = classifier::classify(self.classifier.as_ref(), &sample)?;

        let queue_weight = self.config.signal.queue_weight;
        let plan = signal::allocate(
            sample.ns_demand(queue_weight),
            sample.ew_demand(queue_weight),
            self.prior_plan.as_ref(),
            &self.config.signal,
        )
        .map_err(|err| match err {
            PipelineError::InvalidDemand { ns_demand, ew_demand } => {
                PipelineError::FeatureOutOfRange {
                    junction_id: sample.junction_id.clone(),
                    tick,
                    detail: format!("phase demand ns={ns_demand} ew={ew_demand}"),
                }
            }
            other => other,
        })?;

        // Last step: alert evaluation cannot fail, so cooldown state only
        // changes for ticks that are recorded.
        let alerts = self.alerts.evaluate(&sample, &classification);

        debug!(
            "Pipeline: tick {} {} volume {} -> {} ({:.2}), NS {}s / EW {}s",
            tick,
            sample.junction_id,
            sample.total_volume(),
            classification.level.label(),
            classification.confidence,
            plan.ns_green,
            plan.ew_green
        );

        Ok(TickRecord {
            sample,
            classification,
            plan,
            alerts,
        })
    }

    /// Serialized dump of the current session window.
    pub fn get_window_export(&self, format: ExportFormat) -> Vec<u8> {
        self.window.export_bytes(format)
    }

    pub fn summary(&self) -> SessionSummary {
        self.window.summary()
    }

    pub fn window(&self) -> &SessionWindow {
        &self.window
    }

    pub fn active_alerts(&self) -> &ActiveAlertLog {
        self.alerts.active()
    }

    /// Clear the active alert log and cooldowns. Recorded history is untouched.
    pub fn clear_alerts(&mut self) {
        self.alerts.clear();
    }

    pub fn prior_plan(&self) -> Option<&SignalPlan> {
        self.prior_plan.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Index the next call to `run_tick` will use.
    pub fn next_tick(&self) -> u64 {
        self.next_tick
    }

    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks
    }

    /// Signal parameters without revalidation, for fault-injection tests.
    #[cfg(test)]
    pub(crate) fn signal_params_mut(&mut self) -> &mut crate::config::SignalParams {
        &mut self.config.signal
    }
}

// ---------------------------------------------------------------------------
// SharedPipeline: serialized access for concurrent callers
// ---------------------------------------------------------------------------

/// Cloneable handle that serializes all access to one pipeline behind a mutex,
/// so ticks and exports from several threads never interleave.
#[derive(Clone)]
pub struct SharedPipeline {
    inner: Arc<Mutex<Pipeline>>,
}

impl SharedPipeline {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pipeline)),
        }
    }

    /// Lock the pipeline. A panic in another holder does not leave the
    /// window half-written, so a poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, Pipeline> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn run_tick(&self, scenario: Scenario) -> Result<TickRecord, PipelineError> {
        self.lock().run_tick(scenario)
    }

    pub fn get_window_export(&self, format: ExportFormat) -> Vec<u8> {
        self.lock().get_window_export(format)
    }

    pub fn summary(&self) -> SessionSummary {
        self.lock().summary()
    }

    pub fn clear_alerts(&self) {
        self.lock().clear_alerts();
    }
}
