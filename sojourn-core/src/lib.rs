//! Core domain types for the Sojourn itinerary engine.
//!
//! Responsibilities:
//! - Model attractions, clock times, money and scheduled itineraries.
//! - Define the ports to travel estimation, catalogues, conditions feeds and
//!   history stores.
//! - Check the itinerary invariants every produced schedule must satisfy.
//!
//! Boundaries:
//! - No I/O; adapters live in `sojourn-data`.
//! - Scheduling policy lives in `sojourn-planner`.

#![forbid(unsafe_code)]

mod adjustment;
mod attraction;
mod category;
mod itinerary;
mod money;
mod outcome;
mod ports;
mod serde_duration;
mod time;
mod travel;
mod validate;

pub mod test_support;

pub use adjustment::{AdjustmentRequest, EntryRef};
pub use attraction::{Attraction, AttractionError, AttractionId, Location};
pub use category::{Category, InterestProfile, UnknownCategory};
pub use itinerary::{
    Activity, Itinerary, ItinerarySnapshot, PlanConstraints, ScheduleEntry, SnapshotEntry, Totals,
};
pub use money::{Currency, Money, MoneyError};
pub use outcome::{BuildOutcome, Infeasible, InfeasibleReason};
pub use ports::{
    CandidateSource, ClearConditions, Collaborator, ConditionsSource, HistoryStore, Penalties,
    Preference, PreferenceSubject, Sentiment, SourceError, UserHistory,
};
pub use time::{MINUTES_PER_DAY, TimeError, TimeInterval, TimeOfDay, whole_minutes};
pub use travel::{
    TravelError, TravelEstimator, TravelLeg, TravelMatrix, TravelMode, distinct_locations,
};
pub use validate::{Violation, validate};
