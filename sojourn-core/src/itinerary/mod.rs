//! Scheduled itineraries and their derived totals.
//!
//! An [`Itinerary`] is an immutable snapshot. The only constructor,
//! [`Itinerary::assemble`], derives the totals from the entries so stored
//! totals can never drift from the schedule. Adjustments build a new
//! snapshot instead of editing an existing one.

mod snapshot;

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    Attraction, AttractionId, Currency, Location, Money, MoneyError, TimeInterval, TravelLeg,
};

pub use snapshot::{ItinerarySnapshot, SnapshotEntry};

/// Something that occupies a slot in the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activity {
    /// Visit an attraction.
    Visit(Attraction),
    /// A meal break taken where the traveller already is.
    MealBreak {
        /// Where the break happens.
        location: Location,
    },
}

impl Activity {
    /// Where the activity takes place.
    #[must_use]
    pub const fn location(&self) -> &Location {
        match self {
            Self::Visit(attraction) => &attraction.location,
            Self::MealBreak { location } => location,
        }
    }

    /// The visited attraction, if this is a visit.
    #[must_use]
    pub const fn attraction(&self) -> Option<&Attraction> {
        match self {
            Self::Visit(attraction) => Some(attraction),
            Self::MealBreak { .. } => None,
        }
    }

    /// Identifier of the visited attraction, if this is a visit.
    #[must_use]
    pub fn attraction_id(&self) -> Option<&AttractionId> {
        self.attraction().map(|attraction| &attraction.id)
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Visit(attraction) => &attraction.name,
            Self::MealBreak { .. } => "Meal break",
        }
    }

    /// Whether this is a visit.
    #[must_use]
    pub const fn is_visit(&self) -> bool {
        matches!(self, Self::Visit(_))
    }
}

/// One scheduled activity and the leg taken to reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// What happens.
    pub activity: Activity,
    /// When it happens.
    pub slot: TimeInterval,
    /// How the traveller got there from the previous location.
    pub travel: TravelLeg,
    /// Cost of the activity itself, excluding travel.
    pub cost: Money,
}

/// The constraints a plan was built under, kept for reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConstraints {
    /// Destination city.
    pub city: String,
    /// Date of the plan.
    pub date: NaiveDate,
    /// Day window the schedule must fit in.
    pub window: TimeInterval,
    /// Spending cap covering activities and travel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Money>,
    /// Where the day starts.
    pub start: Location,
    /// Currency every amount is expressed in.
    pub currency: Currency,
}

impl PlanConstraints {
    /// Constraints without a budget cap.
    #[must_use]
    pub fn new(
        city: impl Into<String>,
        date: NaiveDate,
        window: TimeInterval,
        start: Location,
        currency: Currency,
    ) -> Self {
        Self {
            city: city.into(),
            date,
            window,
            budget: None,
            start,
            currency,
        }
    }

    /// Set the budget cap.
    #[must_use]
    pub fn with_budget(mut self, budget: Money) -> Self {
        self.budget = Some(budget);
        self
    }
}

/// Totals derived from a list of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Activity costs plus travel costs.
    pub cost: Money,
    /// Sum of leg durations.
    pub travel_time: Duration,
    /// Sum of leg distances, present only when every leg reports one.
    pub distance_meters: Option<u64>,
}

impl Totals {
    /// Compute totals for `entries` in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError`] when an amount is in another currency or the
    /// sum overflows.
    pub fn of(currency: Currency, entries: &[ScheduleEntry]) -> Result<Self, MoneyError> {
        let mut cost = Money::zero(currency);
        let mut travel_time = Duration::ZERO;
        let mut distance_meters = Some(0_u64);
        for entry in entries {
            cost = cost.checked_add(entry.cost)?.checked_add(entry.travel.cost)?;
            travel_time = travel_time.saturating_add(entry.travel.duration);
            distance_meters = distance_meters
                .zip(entry.travel.distance_meters)
                .map(|(total, leg)| total.saturating_add(u64::from(leg)));
        }
        Ok(Self {
            cost,
            travel_time,
            distance_meters,
        })
    }
}

/// An ordered, validated single-day schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    constraints: PlanConstraints,
    entries: Vec<ScheduleEntry>,
    #[serde(default)]
    excluded: Vec<AttractionId>,
    total_cost: Money,
    #[serde(rename = "total_travel_secs", with = "crate::serde_duration::seconds")]
    total_travel_time: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_distance_meters: Option<u64>,
}

impl Itinerary {
    /// Build an itinerary, deriving its totals from `entries`.
    ///
    /// No ordering or feasibility checks happen here; run
    /// [`crate::validate()`] on the result.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError`] when totals cannot be computed.
    pub fn assemble(
        constraints: PlanConstraints,
        entries: Vec<ScheduleEntry>,
        excluded: Vec<AttractionId>,
    ) -> Result<Self, MoneyError> {
        let totals = Totals::of(constraints.currency, &entries)?;
        Ok(Self {
            constraints,
            entries,
            excluded,
            total_cost: totals.cost,
            total_travel_time: totals.travel_time,
            total_distance_meters: totals.distance_meters,
        })
    }

    /// Constraints the plan was built under.
    #[must_use]
    pub const fn constraints(&self) -> &PlanConstraints {
        &self.constraints
    }

    /// Entries in visiting order.
    #[must_use]
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Candidates that were considered but left out.
    #[must_use]
    pub fn excluded(&self) -> &[AttractionId] {
        &self.excluded
    }

    /// Stored total cost.
    #[must_use]
    pub const fn total_cost(&self) -> Money {
        self.total_cost
    }

    /// Stored total travel time.
    #[must_use]
    pub const fn total_travel_time(&self) -> Duration {
        self.total_travel_time
    }

    /// Stored total distance, when every leg reported one.
    #[must_use]
    pub const fn total_distance_meters(&self) -> Option<u64> {
        self.total_distance_meters
    }

    /// Stored totals as a [`Totals`] value.
    #[must_use]
    pub const fn totals(&self) -> Totals {
        Totals {
            cost: self.total_cost,
            travel_time: self.total_travel_time,
            distance_meters: self.total_distance_meters,
        }
    }

    /// Attractions visited, in order.
    pub fn visits(&self) -> impl Iterator<Item = &Attraction> {
        self.entries
            .iter()
            .filter_map(|entry| entry.activity.attraction())
    }

    /// Number of visits, excluding meal breaks.
    #[must_use]
    pub fn visit_count(&self) -> usize {
        self.visits().count()
    }

    /// Position of the entry visiting `id`.
    #[must_use]
    pub fn position_of(&self, id: &AttractionId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.activity.attraction_id() == Some(id))
    }

    /// Identifiers of the visited attractions, in order.
    #[must_use]
    pub fn visited_ids(&self) -> Vec<AttractionId> {
        self.visits().map(|attraction| attraction.id.clone()).collect()
    }

    /// Flatten into the persisted snapshot shape.
    #[must_use]
    pub fn snapshot(&self) -> ItinerarySnapshot {
        ItinerarySnapshot::from(self)
    }

    #[cfg(test)]
    pub(crate) fn totals_mut(&mut self) -> (&mut Money, &mut Duration) {
        (&mut self.total_cost, &mut self.total_travel_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, TravelMode};
    use rstest::rstest;

    fn entry(name: &str, cost: u64, leg_cost: u64, distance: Option<u32>) -> ScheduleEntry {
        let attraction = Attraction::new(
            name,
            name,
            Category::Art,
            Location::named(name),
            Duration::from_secs(3600),
            Money::from_minor(cost, Currency::USD),
        )
        .expect("attraction");
        let mut travel = TravelLeg::new("prev", name, TravelMode::Walking, Duration::from_secs(600))
            .with_cost(Money::from_minor(leg_cost, Currency::USD));
        travel.distance_meters = distance;
        ScheduleEntry {
            activity: Activity::Visit(attraction),
            slot: "10:00-11:00".parse().expect("slot"),
            travel,
            cost: Money::from_minor(cost, Currency::USD),
        }
    }

    #[rstest]
    fn totals_sum_activities_and_travel() {
        let entries = [entry("a", 2000, 500, Some(800)), entry("b", 1500, 0, Some(200))];
        let totals = Totals::of(Currency::USD, &entries).expect("totals");
        assert_eq!(totals.cost.minor(), 4000);
        assert_eq!(totals.travel_time, Duration::from_secs(1200));
        assert_eq!(totals.distance_meters, Some(1000));
    }

    #[rstest]
    fn distance_is_unknown_when_any_leg_lacks_it() {
        let entries = [entry("a", 0, 0, Some(800)), entry("b", 0, 0, None)];
        let totals = Totals::of(Currency::USD, &entries).expect("totals");
        assert_eq!(totals.distance_meters, None);
    }

    #[rstest]
    fn totals_reject_foreign_amounts() {
        let mut foreign = entry("a", 100, 0, None);
        foreign.cost = Money::from_minor(100, Currency::EUR);
        assert!(Totals::of(Currency::USD, &[foreign]).is_err());
    }
}
