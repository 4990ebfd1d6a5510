//! Itinerary invariant checks.
//!
//! [`validate`] checks, in order:
//!
//! 1. entries are time-ordered and leave room for each travel leg;
//! 2. every slot sits inside the day window and, for visits, inside a
//!    single opening interval, touching intervals merged;
//! 3. all amounts share the plan currency and stay within the budget;
//! 4. legs chain from the starting point through each entry;
//! 5. no attraction is visited twice;
//! 6. stored totals equal freshly computed ones.
//!
//! The first broken invariant is reported.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::itinerary::Totals;
use crate::{AttractionId, Currency, Itinerary, Money};

/// A broken itinerary invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    /// An entry starts before the previous activity and its leg complete.
    #[error("entry {position} starts before the traveller can arrive")]
    Overlap {
        /// Index of the offending entry.
        position: usize,
    },
    /// An entry lies outside the day window.
    #[error("entry {position} falls outside the day window")]
    OutsideWindow {
        /// Index of the offending entry.
        position: usize,
    },
    /// A visit is not covered by a single merged opening interval.
    #[error("entry {position} falls outside the attraction's opening hours")]
    OutsideOpeningHours {
        /// Index of the offending entry.
        position: usize,
    },
    /// An amount is not in the plan currency.
    #[error("entry {position} is priced in a foreign currency")]
    ForeignCurrency {
        /// Index of the offending entry.
        position: usize,
    },
    /// The budget is not in the plan currency.
    #[error("budget in {found} does not match the plan currency {expected}")]
    ForeignBudget {
        /// Plan currency.
        expected: Currency,
        /// Currency of the budget.
        found: Currency,
    },
    /// Spending exceeds the budget.
    #[error("total cost {total} exceeds the budget of {budget}")]
    OverBudget {
        /// Recomputed total.
        total: Money,
        /// Budget cap.
        budget: Money,
    },
    /// A leg does not chain from the previous location to its entry.
    #[error("entry {position} is not reached from the previous location")]
    BrokenTravelChain {
        /// Index of the offending entry.
        position: usize,
    },
    /// The same attraction appears more than once.
    #[error("attraction {id} is scheduled twice")]
    DuplicateAttraction {
        /// Repeated attraction.
        id: AttractionId,
    },
    /// Stored totals disagree with the entries.
    #[error("stored totals do not match the schedule")]
    TotalsMismatch,
}

impl Violation {
    /// Number of the invariant that failed, from 1 to 6.
    #[must_use]
    pub const fn invariant(&self) -> u8 {
        match self {
            Self::Overlap { .. } => 1,
            Self::OutsideWindow { .. } | Self::OutsideOpeningHours { .. } => 2,
            Self::ForeignCurrency { .. } | Self::ForeignBudget { .. } | Self::OverBudget { .. } => {
                3
            }
            Self::BrokenTravelChain { .. } => 4,
            Self::DuplicateAttraction { .. } => 5,
            Self::TotalsMismatch => 6,
        }
    }
}

/// Check every itinerary invariant and report the first violation.
///
/// # Errors
///
/// Returns the first [`Violation`] found.
pub fn validate(itinerary: &Itinerary) -> Result<(), Violation> {
    check_ordering(itinerary)?;
    check_slots(itinerary)?;
    check_budget(itinerary)?;
    check_travel_chain(itinerary)?;
    check_duplicates(itinerary)?;
    check_totals(itinerary)
}

fn check_ordering(itinerary: &Itinerary) -> Result<(), Violation> {
    let mut cursor = itinerary.constraints().window.start();
    for (position, entry) in itinerary.entries().iter().enumerate() {
        let arrival = cursor
            .checked_add(entry.travel.duration)
            .ok_or(Violation::Overlap { position })?;
        if entry.slot.start() < arrival {
            return Err(Violation::Overlap { position });
        }
        cursor = entry.slot.end();
    }
    Ok(())
}

fn check_slots(itinerary: &Itinerary) -> Result<(), Violation> {
    let window = itinerary.constraints().window;
    for (position, entry) in itinerary.entries().iter().enumerate() {
        if !window.contains(&entry.slot) {
            return Err(Violation::OutsideWindow { position });
        }
        if let Some(attraction) = entry.activity.attraction()
            && !attraction.is_open_for(&entry.slot, &window)
        {
            return Err(Violation::OutsideOpeningHours { position });
        }
    }
    Ok(())
}

fn check_budget(itinerary: &Itinerary) -> Result<(), Violation> {
    let constraints = itinerary.constraints();
    let currency = constraints.currency;
    for (position, entry) in itinerary.entries().iter().enumerate() {
        if entry.cost.currency() != currency || entry.travel.cost.currency() != currency {
            return Err(Violation::ForeignCurrency { position });
        }
    }
    let Some(budget) = constraints.budget else {
        return Ok(());
    };
    if budget.currency() != currency {
        return Err(Violation::ForeignBudget {
            expected: currency,
            found: budget.currency(),
        });
    }
    let total = Totals::of(currency, itinerary.entries())
        .map_err(|_| Violation::TotalsMismatch)?
        .cost;
    if total.minor() > budget.minor() {
        return Err(Violation::OverBudget { total, budget });
    }
    Ok(())
}

fn check_travel_chain(itinerary: &Itinerary) -> Result<(), Violation> {
    let mut previous = itinerary.constraints().start.name.as_str();
    for (position, entry) in itinerary.entries().iter().enumerate() {
        let here = entry.activity.location().name.as_str();
        if entry.travel.from != previous || entry.travel.to != here {
            return Err(Violation::BrokenTravelChain { position });
        }
        previous = here;
    }
    Ok(())
}

fn check_duplicates(itinerary: &Itinerary) -> Result<(), Violation> {
    let mut seen = HashSet::new();
    for id in itinerary.visits().map(|attraction| &attraction.id) {
        if !seen.insert(id) {
            return Err(Violation::DuplicateAttraction { id: id.clone() });
        }
    }
    Ok(())
}

fn check_totals(itinerary: &Itinerary) -> Result<(), Violation> {
    let recomputed = Totals::of(itinerary.constraints().currency, itinerary.entries())
        .map_err(|_| Violation::TotalsMismatch)?;
    if recomputed != itinerary.totals() {
        return Err(Violation::TotalsMismatch);
    }
    Ok(())
}
