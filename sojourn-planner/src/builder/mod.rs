//! Greedy constructive schedule builder.
//!
//! The builder walks the candidate pool in rank order and, at each step,
//! places the highest-ranked candidate that still fits. A higher rank beats a
//! tighter fit. Scheduling only reads the prefetched [`TravelMatrix`], so the
//! loop never blocks.

use std::collections::HashSet;

use sojourn_core::{
    Attraction, AttractionId, BuildOutcome, Infeasible, InfeasibleReason, Itinerary, Money,
    PlanConstraints, ScheduleEntry, TravelMatrix, Violation,
};

use crate::MealBreakConfig;
use crate::placement::{Cursor, Placer, Rejection};
use crate::pool::CandidatePool;

/// Explanation attached to an itinerary with no visits.
pub(crate) const NO_FIT_DETAIL: &str = "no candidate fits window/budget from starting point";

/// Builds an initial schedule from a ranked pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleBuilder {
    meal_break: MealBreakConfig,
}

impl ScheduleBuilder {
    /// Builder inserting meal breaks according to `meal_break`.
    #[must_use]
    pub const fn new(meal_break: MealBreakConfig) -> Self {
        Self { meal_break }
    }

    /// Build a schedule for `pool` under `constraints`.
    ///
    /// Returns [`BuildOutcome::Infeasible`] when no visit can be placed.
    /// Candidates left out are listed in the itinerary's `excluded` ids,
    /// followed by those the pool dropped.
    #[must_use]
    pub fn build(
        &self,
        pool: &CandidatePool,
        constraints: &PlanConstraints,
        matrix: &TravelMatrix,
    ) -> BuildOutcome {
        if pool.is_empty() {
            log::info!("candidate pool for {} is empty", constraints.city);
            return BuildOutcome::Infeasible(
                Infeasible::new(InfeasibleReason::EmptyPool, "candidate pool is empty")
                    .with_excluded(pool.dropped().to_vec()),
            );
        }

        let placer = Placer::new(constraints, matrix);
        let mut cursor = Cursor::at_start(constraints);
        let mut remaining: Vec<&Attraction> = pool.candidates().iter().collect();
        let mut entries = Vec::new();
        let mut tally = RejectionTally::default();

        while !remaining.is_empty() {
            if let Some(stop) = margin_exhausted(&remaining, &cursor, &placer) {
                log::debug!("stopping early at {}: {stop:?}", cursor.time);
                tally.record(stop);
                break;
            }
            let mut fit = None;
            if let Some((meal, rested, placed)) = self.meal_then_visit(&remaining, &cursor, &placer) {
                log::debug!("meal break at {}", meal.slot);
                entries.push(meal);
                cursor = rested;
                fit = Some(placed);
            }
            let Some((index, entry)) =
                fit.or_else(|| first_fit(&remaining, &cursor, &placer, &mut tally))
            else {
                break;
            };
            log::debug!("placed {} at {}", entry.activity.label(), entry.slot);
            cursor.advance(&entry);
            entries.push(entry);
            remaining.remove(index);
        }

        let placed: HashSet<&AttractionId> = entries
            .iter()
            .filter_map(|entry| entry.activity.attraction_id())
            .collect();
        let excluded: Vec<AttractionId> = pool
            .candidates()
            .iter()
            .map(|attraction| &attraction.id)
            .filter(|id| !placed.contains(id))
            .chain(pool.dropped())
            .cloned()
            .collect();

        if placed.is_empty() {
            let reason = tally.reason();
            log::info!("no itinerary for {}: {reason:?}", constraints.city);
            return BuildOutcome::Infeasible(
                Infeasible::new(reason, NO_FIT_DETAIL).with_excluded(excluded),
            );
        }
        log::info!(
            "built itinerary for {} with {} visits, {} excluded",
            constraints.city,
            placed.len(),
            excluded.len()
        );
        assemble(constraints.clone(), entries, excluded)
    }

    /// A due meal break and the visit it still leaves room for.
    ///
    /// `None` when no meal is due, none fits, or no candidate fits after it;
    /// the caller then places a visit without the break.
    fn meal_then_visit(
        &self,
        remaining: &[&Attraction],
        cursor: &Cursor,
        placer: &Placer<'_>,
    ) -> Option<(ScheduleEntry, Cursor, (usize, ScheduleEntry))> {
        if !self.meal_break.is_due(cursor.visiting_since_break) {
            return None;
        }
        let meal = self.meal(placer, cursor)?;
        let mut rested = cursor.clone();
        rested.advance(&meal);
        let Some(placed) = first_fit(remaining, &rested, placer, &mut RejectionTally::default())
        else {
            log::debug!("skipping a meal break at {}: no visit fits after it", cursor.time);
            return None;
        };
        Some((meal, rested, placed))
    }

    fn meal(&self, placer: &Placer<'_>, cursor: &Cursor) -> Option<ScheduleEntry> {
        let cost = Money::from_minor(self.meal_break.cost_minor, cursor.spent.currency());
        placer
            .meal(cursor, self.meal_break.duration, cost, None)
            .inspect_err(|rejection| log::debug!("no room for a meal break: {rejection:?}"))
            .ok()
    }
}

/// Counts why candidates were turned away, to classify an empty result.
#[derive(Debug, Default)]
pub(crate) struct RejectionTally {
    over_budget: usize,
    too_late: usize,
}

impl RejectionTally {
    pub(crate) const fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::OverBudget => self.over_budget += 1,
            Rejection::TooLate => self.too_late += 1,
            Rejection::Unreachable | Rejection::Closed | Rejection::ForeignCurrency => {}
        }
    }

    /// Budget trouble wins over window trouble; anything else is no fit.
    pub(crate) const fn reason(&self) -> InfeasibleReason {
        if self.over_budget > 0 {
            InfeasibleReason::BudgetExceeded
        } else if self.too_late > 0 {
            InfeasibleReason::WindowExceeded
        } else {
            InfeasibleReason::NoFit
        }
    }
}

fn first_fit(
    remaining: &[&Attraction],
    cursor: &Cursor,
    placer: &Placer<'_>,
    tally: &mut RejectionTally,
) -> Option<(usize, ScheduleEntry)> {
    remaining
        .iter()
        .enumerate()
        .find_map(|(index, attraction)| match placer.visit(attraction, cursor) {
            Ok(entry) => Some((index, entry)),
            Err(rejection) => {
                log::debug!("skipping {} at {}: {rejection:?}", attraction.id, cursor.time);
                tally.record(rejection);
                None
            }
        })
}

/// Stop once even the shortest or cheapest remaining visit cannot fit.
fn margin_exhausted(
    remaining: &[&Attraction],
    cursor: &Cursor,
    placer: &Placer<'_>,
) -> Option<Rejection> {
    let shortest = remaining.iter().map(|a| a.visit_duration).min()?;
    let fits_in_time = cursor
        .time
        .checked_add(shortest)
        .is_some_and(|end| end <= placer.window.end());
    if !fits_in_time {
        return Some(Rejection::TooLate);
    }
    let budget = placer.budget?;
    let cheapest = remaining.iter().map(|a| a.cost.minor()).min()?;
    (cursor.spent.minor().saturating_add(cheapest) > budget.minor()).then_some(Rejection::OverBudget)
}

/// Assemble an itinerary, reporting impossible totals as a violation.
pub(crate) fn assemble(
    constraints: PlanConstraints,
    entries: Vec<ScheduleEntry>,
    excluded: Vec<AttractionId>,
) -> BuildOutcome {
    match Itinerary::assemble(constraints, entries, excluded) {
        Ok(itinerary) => BuildOutcome::Planned(itinerary),
        Err(err) => {
            log::error!("could not total itinerary: {err}");
            BuildOutcome::Infeasible(Infeasible::new(
                InfeasibleReason::InvariantViolated(Violation::TotalsMismatch),
                err.to_string(),
            ))
        }
    }
}
