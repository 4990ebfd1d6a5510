//! Requests to change an existing itinerary.

use serde::{Deserialize, Serialize};

use crate::{Attraction, AttractionId, Itinerary, Location, Money, TimeInterval, TimeOfDay};

/// Reference to an entry of an existing itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryRef {
    /// The entry visiting this attraction.
    Attraction(AttractionId),
    /// The entry at this zero-based index.
    Position(usize),
}

impl EntryRef {
    /// Index of the referenced entry within `itinerary`, if it exists.
    ///
    /// # Examples
    /// ```
    /// use sojourn_core::EntryRef;
    ///
    /// let by_position = EntryRef::Position(2);
    /// let json = serde_json::to_string(&by_position)?;
    /// assert_eq!(json, r#"{"position":2}"#);
    /// # Ok::<(), serde_json::Error>(())
    /// ```
    #[must_use]
    pub fn resolve(&self, itinerary: &Itinerary) -> Option<usize> {
        match self {
            Self::Attraction(id) => itinerary.position_of(id),
            Self::Position(index) => (*index < itinerary.entries().len()).then_some(*index),
        }
    }
}

/// A requested change to an existing itinerary.
///
/// Every variant follows the same pattern: keep what is still valid, then
/// recompute the remainder of the day forward and validate the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdjustmentRequest {
    /// Drop a stop and close the gap.
    RemoveStop {
        /// Entry to remove.
        target: EntryRef,
    },
    /// Add a new stop, preferably at index `at`.
    InsertStop {
        /// Attraction to add.
        attraction: Attraction,
        /// Desired index in the schedule.
        at: usize,
    },
    /// Start an existing stop at a different time.
    MoveTime {
        /// Entry to move.
        target: EntryRef,
        /// Requested start time.
        start: TimeOfDay,
    },
    /// Set or lift the spending cap.
    ChangeBudget {
        /// New cap, or `None` to remove it.
        budget: Option<Money>,
    },
    /// Start the day somewhere else.
    ReplaceStart {
        /// New starting point.
        start: Location,
    },
    /// Change the day window.
    ChangeWindow {
        /// New window.
        window: TimeInterval,
    },
}

impl AdjustmentRequest {
    /// Short name of the request kind for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RemoveStop { .. } => "remove_stop",
            Self::InsertStop { .. } => "insert_stop",
            Self::MoveTime { .. } => "move_time",
            Self::ChangeBudget { .. } => "change_budget",
            Self::ReplaceStart { .. } => "replace_start",
            Self::ChangeWindow { .. } => "change_window",
        }
    }
}
