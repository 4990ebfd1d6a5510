//! Flat, persistence-oriented view of an itinerary.
//!
//! Field names are part of the storage contract shared with downstream
//! consumers and must not change.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::whole_minutes;
use crate::{Currency, TimeOfDay, TravelMode};

use super::Itinerary;

/// One row of the persisted schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Start of the activity.
    pub time_start: TimeOfDay,
    /// End of the activity.
    pub time_end: TimeOfDay,
    /// Activity label.
    pub activity: String,
    /// Catalogue identifier for visits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attraction_id: Option<String>,
    /// Location name.
    pub location: String,
    /// Length of the activity in minutes.
    pub duration_minutes: u16,
    /// Mode used to reach the location.
    pub travel_method: TravelMode,
    /// Minutes spent reaching the location.
    pub travel_time_minutes: u64,
    /// Activity cost as a decimal string.
    pub cost: String,
}

/// Itinerary in its persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItinerarySnapshot {
    /// Destination city.
    pub city: String,
    /// Plan date.
    pub date: NaiveDate,
    /// Currency of every amount.
    pub currency: Currency,
    /// Scheduled rows in order.
    pub schedule: Vec<SnapshotEntry>,
    /// Total cost as a decimal string.
    pub total_cost: String,
    /// Total travel time in whole minutes.
    pub total_travel_time: u64,
    /// Total distance in kilometres, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_distance: Option<f64>,
}

impl From<&Itinerary> for ItinerarySnapshot {
    fn from(itinerary: &Itinerary) -> Self {
        let constraints = itinerary.constraints();
        let schedule = itinerary
            .entries()
            .iter()
            .map(|entry| SnapshotEntry {
                time_start: entry.slot.start(),
                time_end: entry.slot.end(),
                activity: entry.activity.label().to_owned(),
                attraction_id: entry
                    .activity
                    .attraction_id()
                    .map(|id| id.as_str().to_owned()),
                location: entry.activity.location().name.clone(),
                duration_minutes: entry
                    .slot
                    .end()
                    .minutes()
                    .saturating_sub(entry.slot.start().minutes()),
                travel_method: entry.travel.mode,
                travel_time_minutes: entry.travel.minutes(),
                cost: entry.cost.amount(),
            })
            .collect();
        Self {
            city: constraints.city.clone(),
            date: constraints.date,
            currency: constraints.currency,
            schedule,
            total_cost: itinerary.total_cost().amount(),
            total_travel_time: whole_minutes(itinerary.total_travel_time()),
            total_distance: itinerary.total_distance_meters().map(kilometres),
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "display distances are reported in kilometres"
)]
fn kilometres(meters: u64) -> f64 {
    meters as f64 / 1000.0
}
