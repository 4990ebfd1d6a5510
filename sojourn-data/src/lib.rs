//! Adapters connecting the Sojourn engine to the outside world.
//!
//! Responsibilities:
//! - Estimate walking legs with an OSRM routing service ([`routing`]).
//! - Turn weather forecasts and local news into rank penalties
//!   ([`conditions`]).
//! - Serve attractions from a JSON catalogue ([`catalog`]).
//! - Persist traveller preferences and visits in SQLite ([`history`]).
//!
//! Boundaries:
//! - Do not encode scheduling rules (live in `sojourn-planner`).
//! - Each adapter implements a synchronous port from `sojourn-core`; HTTP
//!   adapters block on an owned runtime internally.
//!
//! Invariants:
//! - Adapters are `Send + Sync` and hold no global state.
//! - API keys never appear in error messages or debug output.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod conditions;
pub mod history;
mod http;
pub mod routing;

pub use catalog::{CatalogError, JsonCatalog};
pub use conditions::{ConditionsConfig, HttpConditionsSource};
pub use history::{HistoryStoreError, SqliteHistoryStore};
pub use http::ClientBuildError;
pub use routing::{OsrmConfig, OsrmTravelEstimator};
