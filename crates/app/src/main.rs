use std::process::ExitCode;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;

use junction_sim::stream::Scenario;
use junction_sim::{
    ActiveScenario, JunctionSimPlugin, Pipeline, PipelineConfig, PipelineError, SimulationSet,
};

mod cli;
mod export;

use cli::CliArgs;
use export::{finish_run, RunPlan};

fn main() -> ExitCode {
    // Usage errors exit with 2, --help and --version with 0.
    let args = CliArgs::parse();
    if args.list_scenarios {
        for scenario in Scenario::ALL {
            println!("{:<32} {}", scenario.tag(), scenario.description());
        }
        return ExitCode::SUCCESS;
    }

    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(10))),
    )
    .add_plugins(LogPlugin::default());

    let pipeline = match build_pipeline(&args) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Cannot start pipeline: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let tick_interval = pipeline.config().tick_interval_secs;
    info!(
        "Starting {} ({}) for {} ticks, {}",
        args.scenario,
        args.scenario.description(),
        args.ticks,
        if args.fast {
            "unpaced".to_string()
        } else {
            format!("one tick every {tick_interval}s")
        }
    );

    app.insert_resource(Time::<Fixed>::from_seconds(f64::from(tick_interval)))
        .insert_resource(pipeline)
        .insert_resource(ActiveScenario(args.scenario))
        .insert_resource(RunPlan {
            ticks: args.ticks,
            export: args.export.clone(),
            format: args.format,
        })
        .add_plugins(JunctionSimPlugin)
        .add_systems(FixedUpdate, finish_run.in_set(SimulationSet::PostSim));

    let exit = if args.fast {
        run_unpaced(&mut app, args.ticks)
    } else {
        app.run()
    };
    match exit {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(_) => ExitCode::FAILURE,
    }
}

fn build_pipeline(args: &CliArgs) -> Result<Pipeline, PipelineError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(capacity) = args.capacity {
        config.window_capacity = capacity;
    }
    Pipeline::new(config)
}

/// Drive `FixedUpdate` back to back until `finish_run` requests exit.
fn run_unpaced(app: &mut App, ticks: u64) -> AppExit {
    app.finish();
    app.cleanup();
    app.update();
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
    app.should_exit().unwrap_or(AppExit::Success)
}
