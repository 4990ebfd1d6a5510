//! Scheduling for the Sojourn itinerary engine.
//!
//! The crate turns a raw catalogue answer into a single-day schedule and
//! keeps that schedule valid as the traveller changes their mind:
//! - [`CandidatePoolBuilder`] filters and ranks attractions using interests,
//!   weather and news penalties, and the traveller's history.
//! - [`ScheduleBuilder`] greedily places the best-ranked candidate that still
//!   fits the window, opening hours and budget, inserting meal breaks.
//! - [`ScheduleAdjuster`] applies incremental edits and re-places whatever
//!   follows the edit.
//! - [`ItineraryEngine`] prefetches travel legs, runs the above and validates
//!   every result; [`TourPlanner`] wires it to the collaborator ports.
//!
//! Scheduling itself performs no I/O. Travel legs are read from a prefetched
//! [`TravelMatrix`](sojourn_core::TravelMatrix).
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use sojourn_core::test_support::{
//!     FlatTravelEstimator, MemoryCatalog, MemoryHistory, StaticConditions,
//! };
//! use sojourn_core::{Attraction, Category, Currency, Location, Money};
//! use sojourn_planner::{PlanRequest, TourPlanner};
//! use std::time::Duration;
//!
//! let tower = Attraction::new(
//!     "tower",
//!     "Clock Tower",
//!     Category::Architecture,
//!     Location::named("tower"),
//!     Duration::from_secs(45 * 60),
//!     Money::from_minor(800, Currency::USD),
//! )?;
//! let planner = TourPlanner::new(
//!     MemoryCatalog::with_attractions([tower]),
//!     StaticConditions::default(),
//!     FlatTravelEstimator::default(),
//!     MemoryHistory::new(),
//! );
//! let request = PlanRequest::new(
//!     "Springfield",
//!     NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default(),
//!     "10:00-16:00".parse()?,
//!     Location::named("hotel"),
//! );
//! let report = planner.plan(&request)?;
//! assert!(report.outcome.is_planned());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod adjust;
mod builder;
mod config;
mod engine;
mod placement;
mod pool;
mod service;

pub use adjust::{AdjustError, ScheduleAdjuster};
pub use builder::ScheduleBuilder;
pub use config::{MealBreakConfig, PlannerConfig, RankWeights};
pub use engine::{EngineError, ItineraryEngine, PlanRequest, RankingContext, RequestError};
pub use pool::{CandidatePool, CandidatePoolBuilder, HistoryHints, rank_order};
pub use service::{PlanError, PlanReport, TourPlanner};
