//! Error types emitted by the Sojourn CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use sojourn_data::{CatalogError, ClientBuildError, HistoryStoreError};
use sojourn_planner::{EngineError, PlanError};
use thiserror::Error;

/// Errors emitted by the Sojourn CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Option name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// The missing path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option naming the path.
        field: &'static str,
        /// The offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// The path being inspected.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening a JSON input failed.
    #[error("failed to open {field} at {path:?}: {source}")]
    OpenInput {
        /// Option naming the input.
        field: &'static str,
        /// Input path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// A JSON input could not be decoded.
    #[error("failed to parse {field} JSON at {path:?}: {source}")]
    ParseInput {
        /// Option naming the input.
        field: &'static str,
        /// Input path.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The attraction catalogue could not be loaded.
    #[error(transparent)]
    LoadCatalog(#[from] CatalogError),
    /// The history database could not be opened.
    #[error("failed to open history database {path:?}: {source}")]
    OpenHistory {
        /// Database path, or `:memory:`.
        path: Utf8PathBuf,
        /// Store failure.
        #[source]
        source: HistoryStoreError,
    },
    /// An HTTP-backed collaborator could not be constructed.
    #[error("failed to build {service} client: {source}")]
    BuildClient {
        /// Which service the client talks to.
        service: &'static str,
        /// Construction failure.
        #[source]
        source: ClientBuildError,
    },
    /// Planning failed before an outcome was reached.
    #[error("planning failed: {0}")]
    Plan(#[from] PlanError),
    /// The adjustment could not be applied.
    #[error("adjustment failed: {0}")]
    Adjust(#[from] EngineError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Saving the itinerary failed.
    #[error("failed to save itinerary to {path:?}: {source}")]
    SaveItinerary {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
}
