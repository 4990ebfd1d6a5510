//! Test helpers for laying out CLI inputs on disk and stubbing services.

use super::*;
use crate::services::ServiceBuilder;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use sojourn_core::test_support::{FlatTravelEstimator, StaticConditions};
use sojourn_core::{Location, Penalties};
use sojourn_data::{ConditionsConfig, OsrmConfig};
use sojourn_planner::PlanRequest;
use std::cell::RefCell;
use tempfile::TempDir;

pub(super) const CATALOGUE: &str = r#"{
    "Springfield": [
        {
            "id": "museum",
            "name": "Springfield Museum",
            "category": "history",
            "location": {"name": "Springfield Museum"},
            "visit_minutes": 90,
            "cost": {"amount": "12.50", "currency": "USD"},
            "opening_hours": [{"start": "09:00", "end": "17:00"}],
            "popularity": 0.8
        },
        {
            "id": "gorge",
            "name": "Springfield Gorge",
            "category": "nature",
            "location": {"name": "Springfield Gorge"},
            "visit_minutes": 60,
            "cost": {"amount": "0", "currency": "USD"},
            "popularity": 0.4
        }
    ]
}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    let text = std::str::from_utf8(contents).expect("utf-8 fixture");
    sojourn_fs::write_utf8(path, text).expect("write fixture");
}

/// A temporary directory holding one command's inputs and outputs.
pub(super) struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self { _tmp: tmp, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write_catalogue(&self) -> Utf8PathBuf {
        let path = self.path("catalogue.json");
        write_utf8(&path, CATALOGUE.as_bytes());
        path
    }

    pub(super) fn write_request(&self, city: &str) -> Utf8PathBuf {
        let request = PlanRequest::new(
            city,
            NaiveDate::from_ymd_opt(2025, 6, 1).expect("date"),
            "09:00-13:00".parse().expect("window"),
            Location::named("hotel"),
        );
        let payload = serde_json::to_string_pretty(&request).expect("serialise request");
        let path = self.path("request.json");
        write_utf8(&path, payload.as_bytes());
        path
    }
}

/// Offline services: flat travel legs and fixed penalties.
#[derive(Debug, Default)]
pub(super) struct StubServices {
    pub(super) penalties: Penalties,
    pub(super) osrm_base_url: RefCell<Option<String>>,
}

impl ServiceBuilder for StubServices {
    type Estimator = FlatTravelEstimator;
    type Conditions = StaticConditions;

    fn estimator(&self, config: OsrmConfig) -> Result<Self::Estimator, CliError> {
        self.osrm_base_url.replace(Some(config.base_url));
        Ok(FlatTravelEstimator::default())
    }

    fn conditions(&self, _config: ConditionsConfig) -> Result<Self::Conditions, CliError> {
        Ok(StaticConditions::new(self.penalties.clone()))
    }
}

/// Count the visits in a printed or saved report.
pub(super) fn visits_in(report: &serde_json::Value) -> usize {
    report["itinerary"]["schedule"]
        .as_array()
        .expect("schedule array")
        .iter()
        .filter(|entry| entry.get("attraction_id").and_then(serde_json::Value::as_str).is_some())
        .count()
}
