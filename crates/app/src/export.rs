//! Stops the run after the requested number of ticks and writes the export.

use std::path::{Path, PathBuf};

use bevy::prelude::*;

use junction_sim::{ExportFormat, Pipeline, TickCounter};

/// When to stop and where the session window goes.
#[derive(Resource, Debug, Clone)]
pub struct RunPlan {
    pub ticks: u64,
    pub export: Option<PathBuf>,
    pub format: ExportFormat,
}

/// Write the current window to `path`.
pub fn write_export(pipeline: &Pipeline, path: &Path, format: ExportFormat) -> std::io::Result<usize> {
    let bytes = pipeline.get_window_export(format);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;
    Ok(bytes.len())
}

/// PostSim system: once the tick budget is spent, log the session, write the
/// export and request exit.
pub fn finish_run(
    tick: Res<TickCounter>,
    plan: Res<RunPlan>,
    pipeline: Res<Pipeline>,
    mut finished: Local<bool>,
    mut exit: EventWriter<AppExit>,
) {
    if *finished || tick.0 < plan.ticks {
        return;
    }
    *finished = true;

    let summary = pipeline.summary();
    match serde_json::to_string(&summary) {
        Ok(json) => info!("Run finished after {} ticks: {}", tick.0, json),
        Err(e) => warn!("Run finished after {} ticks (summary unavailable: {})", tick.0, e),
    }

    let mut status = AppExit::Success;
    if let Some(path) = &plan.export {
        match write_export(&pipeline, path, plan.format) {
            Ok(len) => info!(
                "Exported {} records ({} bytes, {}) to {}",
                pipeline.window().len(),
                len,
                plan.format.extension(),
                path.display()
            ),
            Err(e) => {
                error!("Failed to write export to {}: {}", path.display(), e);
                status = AppExit::error();
            }
        }
    }
    exit.send(status);
}
