//! Reading and checking the files a command consumes.

use std::io::BufReader;

use camino::Utf8Path;
use serde::de::DeserializeOwned;
use sojourn_fs::open_utf8_file;
use sojourn_planner::PlannerConfig;

use crate::{ARG_PLANNER_CONFIG, CliError};

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match sojourn_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Decode the JSON document at `path`.
pub(crate) fn load_json<T: DeserializeOwned>(
    path: &Utf8Path,
    field: &'static str,
) -> Result<T, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        field,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}

/// The planner configuration at `path`, or the defaults.
pub(crate) fn load_planner_config(path: Option<&Utf8Path>) -> Result<PlannerConfig, CliError> {
    path.map_or_else(
        || Ok(PlannerConfig::default()),
        |config| load_json(config, ARG_PLANNER_CONFIG),
    )
}
