//! Plan command implementation for the Sojourn CLI.

use std::fmt;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sojourn_core::Currency;
use sojourn_data::{ConditionsConfig, JsonCatalog, OsrmConfig, SqliteHistoryStore};
use sojourn_planner::{PlanReport, PlanRequest, TourPlanner};

use crate::inputs::{load_json, load_planner_config, require_existing};
use crate::output::{save_outcome, write_outcome};
use crate::services::{HttpServices, ServiceBuilder};
use crate::{
    ARG_CATALOG, ARG_HISTORY_DB, ARG_NEWS_API_KEY, ARG_OSRM_BASE_URL, ARG_PLAN_REQUEST,
    ARG_PLANNER_CONFIG, ARG_SAVE, ARG_USER, ARG_WEATHER_API_KEY, CliError, ENV_PLAN_REQUEST,
};

/// Catalogue read when `--catalog` is not given.
pub(crate) const DEFAULT_CATALOG: &str = "catalogue.json";

const REDACTED: &str = "<redacted>";

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan a single day of sightseeing. The request is a \
                 JSON-encoded PlanRequest; attractions come from a JSON \
                 catalogue, travel legs from an OSRM instance, and weather \
                 and news penalties from WeatherAPI and NewsAPI when keys \
                 are configured.",
    about = "Plan a day of sightseeing"
)]
#[ortho_config(prefix = "SOJOURN")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file containing a PlanRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Path to the JSON attraction catalogue.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// SQLite database holding traveller history; omitted means no history.
    #[arg(long = ARG_HISTORY_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) history_db: Option<Utf8PathBuf>,
    /// Plan on behalf of this traveller, overriding the request.
    #[arg(long = ARG_USER, value_name = "id")]
    #[serde(default)]
    pub(crate) user: Option<String>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// WeatherAPI key; weather is ignored without one.
    #[arg(long = ARG_WEATHER_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) weather_api_key: Option<String>,
    /// NewsAPI key; local news is ignored without one.
    #[arg(long = ARG_NEWS_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) news_api_key: Option<String>,
    /// JSON file overriding meal breaks and rank weights.
    #[arg(long = ARG_PLANNER_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) planner_config: Option<Utf8PathBuf>,
    /// Save the full itinerary here for later adjustment.
    #[arg(long = ARG_SAVE, value_name = "path")]
    #[serde(default)]
    pub(crate) save: Option<Utf8PathBuf>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) catalog: Utf8PathBuf,
    pub(crate) history_db: Option<Utf8PathBuf>,
    pub(crate) user: Option<String>,
    pub(crate) osrm_base_url: String,
    pub(crate) weather_api_key: Option<String>,
    pub(crate) news_api_key: Option<String>,
    pub(crate) planner_config: Option<Utf8PathBuf>,
    pub(crate) save: Option<Utf8PathBuf>,
}

impl fmt::Debug for PlanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanConfig")
            .field("request_path", &self.request_path)
            .field("catalog", &self.catalog)
            .field("history_db", &self.history_db)
            .field("user", &self.user)
            .field("osrm_base_url", &self.osrm_base_url)
            .field("weather_api_key", &self.weather_api_key.as_ref().map(|_| REDACTED))
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| REDACTED))
            .field("planner_config", &self.planner_config)
            .field("save", &self.save)
            .finish()
    }
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_PLAN_REQUEST)?;
        require_existing(&self.catalog, ARG_CATALOG)?;
        if let Some(path) = &self.planner_config {
            require_existing(path, ARG_PLANNER_CONFIG)?;
        }
        Ok(())
    }

    fn osrm(&self, currency: Currency) -> OsrmConfig {
        OsrmConfig::new(self.osrm_base_url.clone()).with_currency(currency)
    }

    fn conditions(&self) -> ConditionsConfig {
        let mut config = ConditionsConfig::default();
        if let Some(key) = &self.weather_api_key {
            config = config.with_weather_key(key.clone());
        }
        if let Some(key) = &self.news_api_key {
            config = config.with_news_key(key.clone());
        }
        config
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_REQUEST,
            env: ENV_PLAN_REQUEST,
        })?;
        let catalog = args
            .catalog
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CATALOG));
        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| OsrmConfig::default().base_url);

        Ok(Self {
            request_path,
            catalog,
            history_db: args.history_db,
            user: args.user,
            osrm_base_url,
            weather_api_key: args.weather_api_key,
            news_api_key: args.news_api_key,
            planner_config: args.planner_config,
            save: args.save,
        })
    }
}

pub(super) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_plan_with(args, &HttpServices, &mut stdout)
}

pub(super) fn run_plan_with<S: ServiceBuilder>(
    args: PlanArgs,
    services: &S,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_plan_config(args)?;
    let report = execute_plan(&config, services)?;
    write_outcome(writer, &report.outcome, &report.advice)?;
    if let Some(path) = &config.save {
        save_outcome(path, &report.outcome)?;
    }
    Ok(())
}

fn execute_plan<S: ServiceBuilder>(
    config: &PlanConfig,
    services: &S,
) -> Result<PlanReport, CliError> {
    let mut request: PlanRequest = load_json(&config.request_path, ARG_PLAN_REQUEST)?;
    if let Some(user) = &config.user {
        request.user = Some(user.clone());
    }
    let planner_config = load_planner_config(config.planner_config.as_deref())?;
    let catalog = JsonCatalog::open(&config.catalog)?;
    let history = open_history(config.history_db.as_deref())?;
    let estimator = services.estimator(config.osrm(request.currency()))?;
    let conditions = services.conditions(config.conditions())?;

    let planner = TourPlanner::with_config(catalog, conditions, estimator, history, planner_config);
    Ok(planner.plan(&request)?)
}

fn open_history(path: Option<&Utf8Path>) -> Result<SqliteHistoryStore, CliError> {
    match path {
        Some(db) => SqliteHistoryStore::open(db).map_err(|source| CliError::OpenHistory {
            path: db.to_path_buf(),
            source,
        }),
        None => SqliteHistoryStore::open_in_memory().map_err(|source| CliError::OpenHistory {
            path: Utf8PathBuf::from(":memory:"),
            source,
        }),
    }
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
