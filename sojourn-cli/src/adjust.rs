//! Adjust command implementation for the Sojourn CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sojourn_core::{AdjustmentRequest, BuildOutcome, Itinerary};
use sojourn_data::OsrmConfig;
use sojourn_planner::ItineraryEngine;

use crate::inputs::{load_json, load_planner_config, require_existing};
use crate::output::{save_outcome, write_outcome};
use crate::services::{HttpServices, ServiceBuilder};
use crate::{
    ARG_ADJUSTMENT, ARG_ITINERARY, ARG_OSRM_BASE_URL, ARG_PLANNER_CONFIG, ARG_SAVE, CliError,
    ENV_ADJUST_ADJUSTMENT, ENV_ADJUST_ITINERARY,
};

/// CLI arguments for the `adjust` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Apply a JSON-encoded AdjustmentRequest to an itinerary \
                 saved by `sojourn plan --save`. Stops after the edit are \
                 re-placed and the result is validated before printing.",
    about = "Adjust a saved itinerary"
)]
#[ortho_config(prefix = "SOJOURN")]
pub(crate) struct AdjustArgs {
    /// Path to a saved itinerary.
    #[arg(value_name = "itinerary")]
    #[serde(default)]
    pub(crate) itinerary_path: Option<Utf8PathBuf>,
    /// Path to a JSON file containing an AdjustmentRequest.
    #[arg(value_name = "adjustment")]
    #[serde(default)]
    pub(crate) adjustment_path: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// JSON file overriding meal breaks and rank weights.
    #[arg(long = ARG_PLANNER_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) planner_config: Option<Utf8PathBuf>,
    /// Save the adjusted itinerary here.
    #[arg(long = ARG_SAVE, value_name = "path")]
    #[serde(default)]
    pub(crate) save: Option<Utf8PathBuf>,
}

impl AdjustArgs {
    pub(crate) fn into_config(self) -> Result<AdjustConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AdjustConfig::try_from(merged)
    }
}

/// Resolved `adjust` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AdjustConfig {
    pub(crate) itinerary_path: Utf8PathBuf,
    pub(crate) adjustment_path: Utf8PathBuf,
    pub(crate) osrm_base_url: String,
    pub(crate) planner_config: Option<Utf8PathBuf>,
    pub(crate) save: Option<Utf8PathBuf>,
}

impl AdjustConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.itinerary_path, ARG_ITINERARY)?;
        require_existing(&self.adjustment_path, ARG_ADJUSTMENT)?;
        if let Some(path) = &self.planner_config {
            require_existing(path, ARG_PLANNER_CONFIG)?;
        }
        Ok(())
    }
}

impl TryFrom<AdjustArgs> for AdjustConfig {
    type Error = CliError;

    fn try_from(args: AdjustArgs) -> Result<Self, Self::Error> {
        let itinerary_path = args.itinerary_path.ok_or(CliError::MissingArgument {
            field: ARG_ITINERARY,
            env: ENV_ADJUST_ITINERARY,
        })?;
        let adjustment_path = args.adjustment_path.ok_or(CliError::MissingArgument {
            field: ARG_ADJUSTMENT,
            env: ENV_ADJUST_ADJUSTMENT,
        })?;
        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| OsrmConfig::default().base_url);

        Ok(Self {
            itinerary_path,
            adjustment_path,
            osrm_base_url,
            planner_config: args.planner_config,
            save: args.save,
        })
    }
}

pub(super) fn run_adjust(args: AdjustArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_adjust_with(args, &HttpServices, &mut stdout)
}

pub(super) fn run_adjust_with<S: ServiceBuilder>(
    args: AdjustArgs,
    services: &S,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let outcome = execute_adjust(&config, services)?;
    write_outcome(writer, &outcome, &[])?;
    if let Some(path) = &config.save {
        save_outcome(path, &outcome)?;
    }
    Ok(())
}

fn execute_adjust<S: ServiceBuilder>(
    config: &AdjustConfig,
    services: &S,
) -> Result<BuildOutcome, CliError> {
    let itinerary: Itinerary = load_json(&config.itinerary_path, ARG_ITINERARY)?;
    let request: AdjustmentRequest = load_json(&config.adjustment_path, ARG_ADJUSTMENT)?;
    let planner_config = load_planner_config(config.planner_config.as_deref())?;
    let currency = itinerary.constraints().currency;
    let estimator = services
        .estimator(OsrmConfig::new(config.osrm_base_url.clone()).with_currency(currency))?;

    log::info!("applying {} to a {}-stop itinerary", request.kind(), itinerary.visit_count());
    let engine = ItineraryEngine::with_config(estimator, planner_config);
    Ok(engine.adjust(&itinerary, &request)?)
}
