//! Command-line interface for planning and adjusting Sojourn itineraries.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod adjust;
mod error;
mod inputs;
mod output;
mod plan;
mod services;

pub use error::CliError;

use adjust::{AdjustArgs, run_adjust};
use plan::{PlanArgs, run_plan};

pub(crate) const ARG_PLAN_REQUEST: &str = "request";
pub(crate) const ARG_CATALOG: &str = "catalog";
pub(crate) const ARG_HISTORY_DB: &str = "history-db";
pub(crate) const ARG_USER: &str = "user";
pub(crate) const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_WEATHER_API_KEY: &str = "weather-api-key";
pub(crate) const ARG_NEWS_API_KEY: &str = "news-api-key";
pub(crate) const ARG_PLANNER_CONFIG: &str = "planner-config";
pub(crate) const ARG_SAVE: &str = "save";
pub(crate) const ARG_ITINERARY: &str = "itinerary";
pub(crate) const ARG_ADJUSTMENT: &str = "adjustment";
pub(crate) const ENV_PLAN_REQUEST: &str = "SOJOURN_CMDS_PLAN_REQUEST_PATH";
pub(crate) const ENV_ADJUST_ITINERARY: &str = "SOJOURN_CMDS_ADJUST_ITINERARY_PATH";
pub(crate) const ENV_ADJUST_ADJUSTMENT: &str = "SOJOURN_CMDS_ADJUST_ADJUSTMENT_PATH";

/// Environment variable holding the log filter directives.
pub const LOG_FILTER_ENV: &str = "SOJOURN_LOG";

/// Run the Sojourn CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, an
/// input cannot be read, or a collaborator fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging();
    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Adjust(args) => run_adjust(args),
    }
}

/// Route `log` records from the library crates to stderr.
fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        log::debug!("logging already initialised: {err}");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "sojourn",
    about = "Plan and adjust single-day sightseeing itineraries",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a day from a JSON request and an attraction catalogue.
    Plan(PlanArgs),
    /// Apply an adjustment to a saved itinerary.
    Adjust(AdjustArgs),
}

#[cfg(test)]
mod tests;
