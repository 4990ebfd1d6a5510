//! Forward recomputation of a schedule tail.

use std::time::Duration;

use sojourn_core::{Activity, Attraction, AttractionId, Money, PlanConstraints, ScheduleEntry};

use crate::placement::{Cursor, Placer, Rejection};

/// Result of re-placing a tail after a kept prefix.
#[derive(Debug)]
pub(crate) struct Reflowed {
    pub(crate) entries: Vec<ScheduleEntry>,
    pub(crate) dropped: Vec<AttractionId>,
    pub(crate) first_rejection: Option<Rejection>,
}

/// What to re-place: the activity plus the slot length and price it had.
#[derive(Debug, Clone)]
pub(crate) struct Pending {
    activity: Activity,
    duration: Duration,
    cost: Money,
}

impl From<&ScheduleEntry> for Pending {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            activity: entry.activity.clone(),
            duration: entry.slot.duration(),
            cost: entry.cost,
        }
    }
}

/// Keep `prefix` verbatim and re-place `tail` in order from where it ends.
///
/// Visits go to their earliest feasible start. A meal break keeps its length
/// and price and is taken where the traveller is, but only when the next
/// visit still fits after it; otherwise the break is skipped. Visits that no
/// longer fit are dropped.
pub(crate) fn reflow(
    constraints: &PlanConstraints,
    placer: &Placer<'_>,
    prefix: Vec<ScheduleEntry>,
    tail: impl IntoIterator<Item = Pending>,
) -> Reflowed {
    let mut cursor = Cursor::after(constraints, &prefix);
    let mut entries = prefix;
    let mut dropped = Vec::new();
    let mut first_rejection = None;
    let mut held_meal: Option<Pending> = None;
    for pending in tail {
        if !pending.activity.is_visit() {
            held_meal = Some(pending);
            continue;
        }
        let Activity::Visit(attraction) = &pending.activity else {
            continue;
        };
        if let Some((meal, rested, visit)) = held_meal
            .as_ref()
            .and_then(|meal| meal_then_visit(placer, &cursor, meal, attraction))
        {
            held_meal = None;
            entries.push(meal);
            cursor = rested;
            cursor.advance(&visit);
            entries.push(visit);
            continue;
        }
        match placer.visit(attraction, &cursor) {
            Ok(entry) => {
                if held_meal.take().is_some() {
                    log::debug!("skipping a meal break that would crowd out {}", attraction.id);
                }
                cursor.advance(&entry);
                entries.push(entry);
            }
            Err(rejection) => {
                log::warn!("dropping {} from the schedule: {rejection:?}", attraction.id);
                dropped.push(attraction.id.clone());
                first_rejection.get_or_insert(rejection);
            }
        }
    }
    trim_trailing_meals(&mut entries);
    Reflowed {
        entries,
        dropped,
        first_rejection,
    }
}

fn meal_then_visit(
    placer: &Placer<'_>,
    cursor: &Cursor,
    meal: &Pending,
    attraction: &Attraction,
) -> Option<(ScheduleEntry, Cursor, ScheduleEntry)> {
    let meal = placer.meal(cursor, meal.duration, meal.cost, None).ok()?;
    let mut rested = cursor.clone();
    rested.advance(&meal);
    let visit = placer.visit(attraction, &rested).ok()?;
    Some((meal, rested, visit))
}

/// A kept meal with nothing after it is dropped.
fn trim_trailing_meals(entries: &mut Vec<ScheduleEntry>) {
    while entries.last().is_some_and(|entry| !entry.activity.is_visit()) {
        entries.pop();
    }
}
