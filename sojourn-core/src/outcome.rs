//! Result of building or adjusting a schedule.
//!
//! Infeasibility is an ordinary value, not an error: asking for a day that
//! cannot be scheduled is a legitimate question with a legitimate answer.

use serde::Serialize;

use crate::{AttractionId, Itinerary, Violation};

/// Why no itinerary could be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// No candidate fits the window and opening hours from the start.
    NoFit,
    /// Candidates fit in time but not within the budget.
    BudgetExceeded,
    /// Candidates are open but cannot finish before the window ends.
    WindowExceeded,
    /// The candidate pool was empty.
    EmptyPool,
    /// The produced schedule failed validation.
    InvariantViolated(Violation),
}

/// An infeasible outcome with a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Infeasible {
    /// Machine-readable reason.
    pub reason: InfeasibleReason,
    /// Explanation for people.
    pub detail: String,
    /// Candidates or stops that were left out.
    pub excluded: Vec<AttractionId>,
}

impl Infeasible {
    /// Build an infeasible outcome.
    #[must_use]
    pub fn new(reason: InfeasibleReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
            excluded: Vec::new(),
        }
    }

    /// Attach the excluded candidates.
    #[must_use]
    pub fn with_excluded(mut self, excluded: Vec<AttractionId>) -> Self {
        self.excluded = excluded;
        self
    }
}

/// Outcome of a build or adjustment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildOutcome {
    /// A feasible itinerary.
    Planned(Itinerary),
    /// No feasible itinerary exists under the constraints.
    Infeasible(Infeasible),
}

impl BuildOutcome {
    /// The itinerary, if planning succeeded.
    #[must_use]
    pub const fn itinerary(&self) -> Option<&Itinerary> {
        match self {
            Self::Planned(itinerary) => Some(itinerary),
            Self::Infeasible(_) => None,
        }
    }

    /// Consume the outcome, keeping the itinerary if there is one.
    #[must_use]
    pub fn into_itinerary(self) -> Option<Itinerary> {
        match self {
            Self::Planned(itinerary) => Some(itinerary),
            Self::Infeasible(_) => None,
        }
    }

    /// The infeasibility report, if planning failed.
    #[must_use]
    pub const fn infeasible(&self) -> Option<&Infeasible> {
        match self {
            Self::Planned(_) => None,
            Self::Infeasible(infeasible) => Some(infeasible),
        }
    }

    /// Whether an itinerary was produced.
    #[must_use]
    pub const fn is_planned(&self) -> bool {
        matches!(self, Self::Planned(_))
    }
}
