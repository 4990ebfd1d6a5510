//! A single hop between two locations.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Currency, Money};

/// How a traveller moves along a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// On foot.
    #[default]
    Walking,
    /// Public transport.
    Transit,
    /// Car or taxi.
    Driving,
    /// Bicycle.
    Cycling,
}

impl TravelMode {
    /// Lowercase name of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Transit => "transit",
            Self::Driving => "driving",
            Self::Cycling => "cycling",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Travel from one named location to another.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use sojourn_core::{Currency, Money, TravelLeg, TravelMode};
///
/// let leg = TravelLeg::new("Hotel", "Museum", TravelMode::Transit, Duration::from_secs(600))
///     .with_cost(Money::from_minor(250, Currency::EUR));
/// assert_eq!(leg.minutes(), 10);
/// assert!(!leg.is_stationary());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelLeg {
    /// Origin location name.
    pub from: String,
    /// Destination location name.
    pub to: String,
    /// Mode of travel.
    pub mode: TravelMode,
    /// Time spent travelling.
    #[serde(rename = "duration_secs", with = "crate::serde_duration::seconds")]
    pub duration: Duration,
    /// Fare or other travel cost.
    pub cost: Money,
    /// Distance covered, when the estimator reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u32>,
}

impl TravelLeg {
    /// A free leg with no distance information.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        mode: TravelMode,
        duration: Duration,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            mode,
            duration,
            cost: Money::zero(Currency::default()),
            distance_meters: None,
        }
    }

    /// A zero-length leg that stays at `location`.
    #[must_use]
    pub fn stationary(location: &str, currency: Currency) -> Self {
        Self {
            from: location.to_owned(),
            to: location.to_owned(),
            mode: TravelMode::Walking,
            duration: Duration::ZERO,
            cost: Money::zero(currency),
            distance_meters: Some(0),
        }
    }

    /// Set the cost.
    #[must_use]
    pub fn with_cost(mut self, cost: Money) -> Self {
        self.cost = cost;
        self
    }

    /// Set the distance.
    #[must_use]
    pub fn with_distance(mut self, meters: u32) -> Self {
        self.distance_meters = Some(meters);
        self
    }

    /// Whole minutes the leg occupies on the schedule, rounding up.
    #[must_use]
    pub fn minutes(&self) -> u64 {
        crate::time::whole_minutes(self.duration)
    }

    /// Whether the leg stays at its origin.
    #[must_use]
    pub fn is_stationary(&self) -> bool {
        self.from == self.to && self.duration.is_zero()
    }
}
