//! The placement rule shared by the builder and the adjuster.
//!
//! A visit is placed at the earliest start that is reachable from the cursor
//! and inside one opening interval clipped to the day window, provided it
//! finishes before that interval closes and its cost plus the leg's cost
//! fits the remaining budget.

use std::time::Duration;

use sojourn_core::{
    Activity, Attraction, InfeasibleReason, Location, Money, PlanConstraints, ScheduleEntry,
    TimeInterval, TimeOfDay, TravelLeg, TravelMatrix,
};

/// Why an activity could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    /// No leg leads from the cursor to the activity.
    Unreachable,
    /// The attraction is not open at any time inside the window.
    Closed,
    /// Open inside the window, but the activity cannot finish in time.
    TooLate,
    /// The activity and its leg would exceed the budget.
    OverBudget,
    /// The activity or its leg is priced in another currency.
    ForeignCurrency,
}

impl Rejection {
    pub(crate) const fn reason(self) -> InfeasibleReason {
        match self {
            Self::OverBudget => InfeasibleReason::BudgetExceeded,
            Self::TooLate => InfeasibleReason::WindowExceeded,
            Self::Unreachable | Self::Closed | Self::ForeignCurrency => InfeasibleReason::NoFit,
        }
    }
}

/// Where the traveller is, when, and how much has been spent.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Cursor {
    pub(crate) time: TimeOfDay,
    pub(crate) location: Location,
    pub(crate) spent: Money,
    pub(crate) visiting_since_break: Duration,
}

impl Cursor {
    /// The start of the day described by `constraints`.
    pub(crate) fn at_start(constraints: &PlanConstraints) -> Self {
        Self {
            time: constraints.window.start(),
            location: constraints.start.clone(),
            spent: Money::zero(constraints.currency),
            visiting_since_break: Duration::ZERO,
        }
    }

    /// The cursor left behind after `entries`.
    pub(crate) fn after(constraints: &PlanConstraints, entries: &[ScheduleEntry]) -> Self {
        let mut cursor = Self::at_start(constraints);
        for entry in entries {
            cursor.advance(entry);
        }
        cursor
    }

    /// Move past `entry`.
    pub(crate) fn advance(&mut self, entry: &ScheduleEntry) {
        self.time = entry.slot.end();
        self.location = entry.activity.location().clone();
        self.spent = self
            .spent
            .checked_add(entry.cost)
            .and_then(|spent| spent.checked_add(entry.travel.cost))
            .unwrap_or(self.spent);
        if entry.activity.is_visit() {
            self.visiting_since_break = self.visiting_since_break.saturating_add(entry.slot.duration());
        } else {
            self.visiting_since_break = Duration::ZERO;
        }
    }
}

/// Fixed inputs of a placement pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placer<'a> {
    pub(crate) window: TimeInterval,
    pub(crate) budget: Option<Money>,
    pub(crate) matrix: &'a TravelMatrix,
}

impl<'a> Placer<'a> {
    pub(crate) const fn new(constraints: &PlanConstraints, matrix: &'a TravelMatrix) -> Self {
        Self {
            window: constraints.window,
            budget: constraints.budget,
            matrix,
        }
    }

    /// Same placement rule without a spending cap.
    pub(crate) const fn without_budget(self) -> Self {
        Self {
            budget: None,
            ..self
        }
    }

    /// Place a visit to `attraction` at its earliest feasible start.
    pub(crate) fn visit(
        &self,
        attraction: &Attraction,
        cursor: &Cursor,
    ) -> Result<ScheduleEntry, Rejection> {
        let leg = self.leg_to(cursor, &attraction.location)?;
        let arrival = cursor
            .time
            .checked_add(leg.duration)
            .ok_or(Rejection::TooLate)?;
        let slot = self.earliest_slot(attraction, arrival)?;
        self.afford(cursor, attraction.cost, &leg)?;
        Ok(ScheduleEntry {
            activity: Activity::Visit(attraction.clone()),
            slot,
            travel: leg,
            cost: attraction.cost,
        })
    }

    /// Place a visit to `attraction` starting exactly at `start`.
    pub(crate) fn visit_at(
        &self,
        attraction: &Attraction,
        cursor: &Cursor,
        start: TimeOfDay,
    ) -> Result<ScheduleEntry, Rejection> {
        let leg = self.leg_to(cursor, &attraction.location)?;
        let arrival = cursor
            .time
            .checked_add(leg.duration)
            .ok_or(Rejection::TooLate)?;
        if start < arrival {
            return Err(Rejection::Unreachable);
        }
        let slot = TimeInterval::starting_at(start, attraction.visit_duration)
            .filter(|slot| self.window.contains(slot))
            .ok_or(Rejection::TooLate)?;
        if !attraction.is_open_for(&slot, &self.window) {
            return Err(Rejection::Closed);
        }
        self.afford(cursor, attraction.cost, &leg)?;
        Ok(ScheduleEntry {
            activity: Activity::Visit(attraction.clone()),
            slot,
            travel: leg,
            cost: attraction.cost,
        })
    }

    /// Place a meal break of `duration` costing `cost` where the cursor is.
    pub(crate) fn meal(
        &self,
        cursor: &Cursor,
        duration: Duration,
        cost: Money,
        start: Option<TimeOfDay>,
    ) -> Result<ScheduleEntry, Rejection> {
        let begin = start.unwrap_or(cursor.time);
        if begin < cursor.time {
            return Err(Rejection::Unreachable);
        }
        let slot = TimeInterval::starting_at(begin, duration)
            .filter(|slot| self.window.contains(slot))
            .ok_or(Rejection::TooLate)?;
        let leg = TravelLeg::stationary(&cursor.location.name, cursor.spent.currency());
        self.afford(cursor, cost, &leg)?;
        Ok(ScheduleEntry {
            activity: Activity::MealBreak {
                location: cursor.location.clone(),
            },
            slot,
            travel: leg,
            cost,
        })
    }

    fn leg_to(&self, cursor: &Cursor, to: &Location) -> Result<TravelLeg, Rejection> {
        self.matrix
            .leg(&cursor.location.name, &to.name)
            .cloned()
            .ok_or(Rejection::Unreachable)
    }

    fn earliest_slot(
        &self,
        attraction: &Attraction,
        arrival: TimeOfDay,
    ) -> Result<TimeInterval, Rejection> {
        let open = attraction.open_during(&self.window);
        if open.is_empty() {
            return Err(Rejection::Closed);
        }
        open.iter()
            .find_map(|interval| {
                let start = arrival.max(interval.start());
                TimeInterval::starting_at(start, attraction.visit_duration)
                    .filter(|slot| interval.contains(slot))
            })
            .ok_or(Rejection::TooLate)
    }

    fn afford(&self, cursor: &Cursor, cost: Money, leg: &TravelLeg) -> Result<(), Rejection> {
        let total = cursor
            .spent
            .checked_add(cost)
            .and_then(|spent| spent.checked_add(leg.cost))
            .map_err(|_| Rejection::ForeignCurrency)?;
        match self.budget {
            Some(budget) if total.minor() > budget.minor() => Err(Rejection::OverBudget),
            _ => Ok(()),
        }
    }
}
