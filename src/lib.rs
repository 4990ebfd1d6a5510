//! Facade crate for the Sojourn itinerary engine.
//!
//! This crate re-exports the core domain types and the planner, and exposes
//! the networked and on-disk adapters behind the `data` feature.

#![forbid(unsafe_code)]

pub use sojourn_core::{
    AdjustmentRequest, Attraction, AttractionId, BuildOutcome, CandidateSource, Category,
    ConditionsSource, Currency, EntryRef, HistoryStore, Infeasible, InfeasibleReason,
    InterestProfile, Itinerary, ItinerarySnapshot, Location, Money, Penalties, TimeInterval,
    TimeOfDay, TravelEstimator, TravelLeg, TravelMatrix,
};
pub use sojourn_planner::{
    EngineError, ItineraryEngine, PlanError, PlanReport, PlanRequest, PlannerConfig, TourPlanner,
};

#[cfg(feature = "data")]
pub use sojourn_data::{
    ConditionsConfig, HttpConditionsSource, JsonCatalog, OsrmConfig, OsrmTravelEstimator,
    SqliteHistoryStore,
};
