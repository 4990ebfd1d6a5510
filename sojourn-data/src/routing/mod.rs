//! Travel estimation against an OSRM routing service.
//!
//! [`OsrmTravelEstimator`] implements [`sojourn_core::TravelEstimator`] by
//! calling the OSRM Table API. The port is synchronous, so the estimator
//! blocks on its HTTP calls internally.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use sojourn_core::Currency;
//! use sojourn_data::routing::{OsrmConfig, OsrmTravelEstimator};
//!
//! let config = OsrmConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(60))
//!     .with_user_agent("my-app/1.0")
//!     .with_currency(Currency::EUR);
//! let estimator = OsrmTravelEstimator::with_config(config)?;
//! # Ok::<(), sojourn_data::ClientBuildError>(())
//! ```

mod estimator;
mod osrm;

pub use estimator::{DEFAULT_USER_AGENT, OsrmConfig, OsrmTravelEstimator};
