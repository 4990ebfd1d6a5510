//! Incremental schedule adjustment.
//!
//! Every adjustment keeps what is still valid, re-places the rest of the day
//! forward with the builder's placement rule, and returns a new itinerary.
//! The input itinerary is only borrowed.

mod reflow;

use sojourn_core::{
    AdjustmentRequest, Attraction, AttractionError, AttractionId, BuildOutcome, Currency, EntryRef,
    Infeasible, InfeasibleReason, Itinerary, Location, Money, PlanConstraints, ScheduleEntry,
    TimeInterval, TimeOfDay, Totals, TravelMatrix,
};
use thiserror::Error;

use crate::builder::assemble;
use crate::placement::{Cursor, Placer};

use self::reflow::{Pending, reflow};

/// Adjustment requests that cannot be applied to the given itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdjustError {
    /// The referenced entry does not exist.
    #[error("no schedule entry matches {target:?}")]
    UnknownEntry {
        /// Reference that failed to resolve.
        target: EntryRef,
    },
    /// The insertion index lies past the end of the schedule.
    #[error("insertion index {at} is past the end of a {len}-entry schedule")]
    PositionOutOfRange {
        /// Requested index.
        at: usize,
        /// Number of entries in the schedule.
        len: usize,
    },
    /// The attraction to insert is already scheduled.
    #[error("attraction {id} is already scheduled")]
    DuplicateStop {
        /// Repeated attraction.
        id: AttractionId,
    },
    /// The attraction to insert is malformed.
    #[error(transparent)]
    InvalidAttraction(#[from] AttractionError),
    /// An amount is not in the plan currency.
    #[error("amount in {found} does not match the plan currency {expected}")]
    CurrencyMismatch {
        /// Plan currency.
        expected: Currency,
        /// Currency supplied.
        found: Currency,
    },
}

/// Applies [`AdjustmentRequest`]s to existing itineraries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleAdjuster;

impl ScheduleAdjuster {
    /// Apply `request` to `itinerary`, reading travel legs from `matrix`.
    ///
    /// # Errors
    ///
    /// Returns [`AdjustError`] when the request does not make sense for this
    /// itinerary. A request that makes sense but leaves no feasible day is
    /// reported as [`BuildOutcome::Infeasible`] instead.
    pub fn adjust(
        &self,
        itinerary: &Itinerary,
        request: &AdjustmentRequest,
        matrix: &TravelMatrix,
    ) -> Result<BuildOutcome, AdjustError> {
        let outcome = match request {
            AdjustmentRequest::RemoveStop { target } => remove_stop(itinerary, target, matrix)?,
            AdjustmentRequest::InsertStop { attraction, at } => {
                insert_stop(itinerary, attraction, *at, matrix)?
            }
            AdjustmentRequest::MoveTime { target, start } => {
                move_time(itinerary, target, *start, matrix)?
            }
            AdjustmentRequest::ChangeBudget { budget } => {
                change_budget(itinerary, *budget, matrix)?
            }
            AdjustmentRequest::ReplaceStart { start } => {
                replace_start(itinerary, start, matrix)
            }
            AdjustmentRequest::ChangeWindow { window } => {
                change_window(itinerary, *window, matrix)
            }
        };
        match &outcome {
            BuildOutcome::Planned(adjusted) => log::info!(
                "{} left {} of {} entries",
                request.kind(),
                adjusted.entries().len(),
                itinerary.entries().len()
            ),
            BuildOutcome::Infeasible(infeasible) => log::info!(
                "{} is infeasible: {}",
                request.kind(),
                infeasible.detail
            ),
        }
        Ok(outcome)
    }
}

fn resolve(itinerary: &Itinerary, target: &EntryRef) -> Result<usize, AdjustError> {
    target
        .resolve(itinerary)
        .ok_or_else(|| AdjustError::UnknownEntry {
            target: target.clone(),
        })
}

/// Entries before `at`, and the pending tail after skipping `skip` entries.
fn split(entries: &[ScheduleEntry], at: usize, skip: usize) -> (Vec<ScheduleEntry>, Vec<Pending>) {
    let (prefix, rest) = entries.split_at_checked(at).unwrap_or((entries, &[]));
    let tail = rest.iter().skip(skip).map(Pending::from).collect();
    (prefix.to_vec(), tail)
}

fn pending(entries: &[ScheduleEntry]) -> Vec<Pending> {
    entries.iter().map(Pending::from).collect()
}

/// Wrap reflowed entries into an outcome.
fn finish(
    request: &'static str,
    constraints: PlanConstraints,
    entries: Vec<ScheduleEntry>,
    previously_excluded: &[AttractionId],
    dropped: Vec<AttractionId>,
    empty_reason: InfeasibleReason,
) -> BuildOutcome {
    if !entries.iter().any(|entry| entry.activity.is_visit()) {
        return BuildOutcome::Infeasible(
            Infeasible::new(empty_reason, format!("no stop remains after {request}"))
                .with_excluded(dropped),
        );
    }
    let mut excluded = previously_excluded.to_vec();
    for id in dropped {
        if !excluded.contains(&id) {
            excluded.push(id);
        }
    }
    assemble(constraints, entries, excluded)
}

fn check_currency(constraints: &PlanConstraints, amount: Money) -> Result<(), AdjustError> {
    if amount.currency() == constraints.currency {
        Ok(())
    } else {
        Err(AdjustError::CurrencyMismatch {
            expected: constraints.currency,
            found: amount.currency(),
        })
    }
}

fn remove_stop(
    itinerary: &Itinerary,
    target: &EntryRef,
    matrix: &TravelMatrix,
) -> Result<BuildOutcome, AdjustError> {
    let index = resolve(itinerary, target)?;
    let constraints = itinerary.constraints();
    let placer = Placer::new(constraints, matrix);
    let (prefix, tail) = split(itinerary.entries(), index, 1);
    let reflowed = reflow(constraints, &placer, prefix, tail);
    Ok(finish(
        "remove_stop",
        constraints.clone(),
        reflowed.entries,
        itinerary.excluded(),
        reflowed.dropped,
        InfeasibleReason::NoFit,
    ))
}

fn insert_stop(
    itinerary: &Itinerary,
    attraction: &Attraction,
    at: usize,
    matrix: &TravelMatrix,
) -> Result<BuildOutcome, AdjustError> {
    attraction.validate()?;
    let constraints = itinerary.constraints();
    check_currency(constraints, attraction.cost)?;
    if itinerary.position_of(&attraction.id).is_some() {
        return Err(AdjustError::DuplicateStop {
            id: attraction.id.clone(),
        });
    }
    let entries = itinerary.entries();
    if at > entries.len() {
        return Err(AdjustError::PositionOutOfRange {
            at,
            len: entries.len(),
        });
    }
    let excluded: Vec<AttractionId> = itinerary
        .excluded()
        .iter()
        .filter(|id| **id != attraction.id)
        .cloned()
        .collect();
    let placer = Placer::new(constraints, matrix);

    let (mut prefix, tail) = split(entries, at, 0);
    if let Ok(entry) = placer.visit(attraction, &Cursor::after(constraints, &prefix)) {
        prefix.push(entry);
        let reflowed = reflow(constraints, &placer, prefix, tail);
        if reflowed.first_rejection.is_none() {
            return Ok(assemble(constraints.clone(), reflowed.entries, excluded));
        }
        log::debug!(
            "inserting {} at {at} would displace later stops",
            attraction.id
        );
    }

    match placer.visit(attraction, &Cursor::after(constraints, entries)) {
        Ok(entry) => {
            let mut appended = entries.to_vec();
            appended.push(entry);
            Ok(assemble(constraints.clone(), appended, excluded))
        }
        Err(rejection) => Ok(BuildOutcome::Infeasible(
            Infeasible::new(
                rejection.reason(),
                format!(
                    "{} fits neither at position {at} nor at the end of the day",
                    attraction.id
                ),
            )
            .with_excluded(vec![attraction.id.clone()]),
        )),
    }
}

fn move_time(
    itinerary: &Itinerary,
    target: &EntryRef,
    start: TimeOfDay,
    matrix: &TravelMatrix,
) -> Result<BuildOutcome, AdjustError> {
    let index = resolve(itinerary, target)?;
    let entries = itinerary.entries();
    let Some(moved) = entries.get(index) else {
        return Err(AdjustError::UnknownEntry {
            target: target.clone(),
        });
    };
    let constraints = itinerary.constraints();
    let placer = Placer::new(constraints, matrix);
    let (mut prefix, tail) = split(entries, index, 1);
    let cursor = Cursor::after(constraints, &prefix);
    let placed = match moved.activity.attraction() {
        Some(attraction) => placer.visit_at(attraction, &cursor, start),
        None => placer.meal(&cursor, moved.slot.duration(), moved.cost, Some(start)),
    };
    let entry = match placed {
        Ok(entry) => entry,
        Err(rejection) => {
            return Ok(BuildOutcome::Infeasible(
                Infeasible::new(
                    rejection.reason(),
                    format!("{} cannot start at {start}", moved.activity.label()),
                )
                .with_excluded(moved.activity.attraction_id().cloned().into_iter().collect()),
            ));
        }
    };
    prefix.push(entry);
    let reflowed = reflow(constraints, &placer, prefix, tail);
    Ok(finish(
        "move_time",
        constraints.clone(),
        reflowed.entries,
        itinerary.excluded(),
        reflowed.dropped,
        InfeasibleReason::NoFit,
    ))
}

fn change_budget(
    itinerary: &Itinerary,
    budget: Option<Money>,
    matrix: &TravelMatrix,
) -> Result<BuildOutcome, AdjustError> {
    let mut constraints = itinerary.constraints().clone();
    if let Some(cap) = budget {
        check_currency(&constraints, cap)?;
    }
    constraints.budget = budget;
    let Some(cap) = budget.filter(|cap| itinerary.total_cost().minor() > cap.minor()) else {
        return Ok(assemble(
            constraints,
            itinerary.entries().to_vec(),
            itinerary.excluded().to_vec(),
        ));
    };

    // Budget drops follow rank, so placement itself must not enforce the cap.
    let placer = Placer::new(&constraints, matrix).without_budget();
    let mut entries = itinerary.entries().to_vec();
    let mut dropped = Vec::new();
    while over_cap(&constraints, &entries, cap) {
        let Some(victim) = lowest_ranked_visit(&entries) else {
            break;
        };
        let (prefix, tail) = split(&entries, victim, 1);
        if let Some(id) = entries.get(victim).and_then(|e| e.activity.attraction_id()) {
            log::warn!("dropping {id} to stay within {cap}");
            dropped.push(id.clone());
        }
        let reflowed = reflow(&constraints, &placer, prefix, tail);
        dropped.extend(reflowed.dropped);
        entries = reflowed.entries;
    }
    Ok(finish(
        "change_budget",
        constraints,
        entries,
        itinerary.excluded(),
        dropped,
        InfeasibleReason::BudgetExceeded,
    ))
}

fn over_cap(constraints: &PlanConstraints, entries: &[ScheduleEntry], cap: Money) -> bool {
    !Totals::of(constraints.currency, entries)
        .is_ok_and(|totals| totals.cost.minor() <= cap.minor())
}

/// Lowest rank first; among equals, the later position.
fn lowest_ranked_visit(entries: &[ScheduleEntry]) -> Option<usize> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| entry.activity.attraction().map(|a| (index, a.rank)))
        .min_by(|(lhs_index, lhs_rank), (rhs_index, rhs_rank)| {
            lhs_rank
                .total_cmp(rhs_rank)
                .then_with(|| rhs_index.cmp(lhs_index))
        })
        .map(|(index, _)| index)
}

fn replace_start(itinerary: &Itinerary, start: &Location, matrix: &TravelMatrix) -> BuildOutcome {
    let mut constraints = itinerary.constraints().clone();
    constraints.start = start.clone();
    replan("replace_start", itinerary, constraints, matrix)
}

fn change_window(
    itinerary: &Itinerary,
    window: TimeInterval,
    matrix: &TravelMatrix,
) -> BuildOutcome {
    let mut constraints = itinerary.constraints().clone();
    constraints.window = window;
    replan("change_window", itinerary, constraints, matrix)
}

/// Re-place the whole schedule in its existing order under new constraints.
fn replan(
    request: &'static str,
    itinerary: &Itinerary,
    constraints: PlanConstraints,
    matrix: &TravelMatrix,
) -> BuildOutcome {
    let placer = Placer::new(&constraints, matrix);
    let reflowed = reflow(
        &constraints,
        &placer,
        Vec::new(),
        pending(itinerary.entries()),
    );
    finish(
        request,
        constraints,
        reflowed.entries,
        itinerary.excluded(),
        reflowed.dropped,
        InfeasibleReason::NoFit,
    )
}
