//! Command-line flags for the headless junction driver.

use std::path::PathBuf;

use clap::Parser;

use junction_sim::stream::Scenario;
use junction_sim::ExportFormat;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "junction",
    author,
    version,
    about = "Adaptive signal timing for a single four-way junction"
)]
pub struct CliArgs {
    /// morning-peak | balanced-evening | incident-eastbound | recorded | recorded:<set>
    #[arg(long, default_value = "morning-peak")]
    pub scenario: Scenario,

    /// Number of ticks to run before exiting
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
    pub ticks: u64,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the configured seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the configured window capacity
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Write the session window here on exit
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// csv | json
    #[arg(long, default_value = "csv")]
    pub format: ExportFormat,

    /// Run ticks back to back instead of on the tick interval
    #[arg(long)]
    pub fast: bool,

    /// Print the available scenarios and exit
    #[arg(long)]
    pub list_scenarios: bool,
}
