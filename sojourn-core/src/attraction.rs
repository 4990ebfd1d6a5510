//! Attractions offered by the catalogue and the places they sit at.

use std::borrow::Borrow;
use std::fmt;
use std::time::Duration;

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Category, Money, TimeInterval};

/// Opaque catalogue identifier of an attraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttractionId(String);

impl AttractionId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttractionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AttractionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for AttractionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A named place, optionally pinned to WGS84 coordinates.
///
/// The name identifies the location when looking up travel legs; `coord`
/// uses `x` for longitude and `y` for latitude.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sojourn_core::Location;
///
/// let hotel = Location::named("Hotel Lumen").at(Coord { x: 2.35, y: 48.86 });
/// assert_eq!(hotel.name, "Hotel Lumen");
/// assert!(hotel.coord.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display name, unique within one plan.
    pub name: String,
    /// Position, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord: Option<Coord<f64>>,
}

impl Location {
    /// A location known only by name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coord: None,
        }
    }

    /// Attach coordinates.
    #[must_use]
    pub fn at(mut self, coord: Coord<f64>) -> Self {
        self.coord = Some(coord);
        self
    }
}

/// Reasons an [`Attraction`] record is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttractionError {
    /// The attraction has an empty name.
    #[error("attraction {id} has no name")]
    EmptyName {
        /// Offending attraction.
        id: AttractionId,
    },
    /// The nominal visit duration is zero.
    #[error("attraction {id} has a zero visit duration")]
    ZeroDuration {
        /// Offending attraction.
        id: AttractionId,
    },
    /// Popularity lies outside `0.0..=1.0`.
    #[error("attraction {id} has popularity outside 0.0..=1.0")]
    InvalidPopularity {
        /// Offending attraction.
        id: AttractionId,
    },
}

/// A visitable attraction as supplied by the catalogue.
///
/// Opening intervals are local times on the plan date; an empty list means
/// the attraction is open all day. `rank` is filled in by the candidate pool
/// and is zero for fresh catalogue records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    /// Catalogue identifier.
    pub id: AttractionId,
    /// Display name.
    pub name: String,
    /// Category used for interest matching.
    pub category: Category,
    /// Where the attraction is.
    pub location: Location,
    /// Nominal time spent at the attraction.
    #[serde(rename = "visit_minutes", with = "crate::serde_duration::minutes")]
    pub visit_duration: Duration,
    /// Nominal entry cost.
    pub cost: Money,
    /// Opening intervals on the plan date.
    #[serde(default)]
    pub opening_hours: Vec<TimeInterval>,
    /// Catalogue popularity in `0.0..=1.0`.
    #[serde(default)]
    pub popularity: f32,
    /// Whether the attraction can be visited at all.
    #[serde(default = "available_by_default")]
    pub available: bool,
    /// Priority assigned by the candidate pool; higher is better.
    #[serde(default)]
    pub rank: f32,
}

const fn available_by_default() -> bool {
    true
}

impl Attraction {
    /// Build an attraction that is open all day with neutral popularity.
    ///
    /// # Errors
    ///
    /// Returns [`AttractionError`] when the record fails [`Attraction::validate`].
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use sojourn_core::{Attraction, Category, Currency, Location, Money};
    ///
    /// let louvre = Attraction::new(
    ///     "louvre",
    ///     "Louvre",
    ///     Category::Art,
    ///     Location::named("Louvre"),
    ///     Duration::from_secs(2 * 60 * 60),
    ///     Money::parse("22", Currency::EUR)?,
    /// )?;
    /// assert!(louvre.available);
    /// assert!(louvre.opening_hours.is_empty());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(
        id: impl Into<AttractionId>,
        name: impl Into<String>,
        category: Category,
        location: Location,
        visit_duration: Duration,
        cost: Money,
    ) -> Result<Self, AttractionError> {
        let attraction = Self {
            id: id.into(),
            name: name.into(),
            category,
            location,
            visit_duration,
            cost,
            opening_hours: Vec::new(),
            popularity: 0.0,
            available: true,
            rank: 0.0,
        };
        attraction.validate()?;
        Ok(attraction)
    }

    /// Replace the opening intervals.
    #[must_use]
    pub fn with_opening_hours(mut self, opening_hours: Vec<TimeInterval>) -> Self {
        self.opening_hours = opening_hours;
        self
    }

    /// Set catalogue popularity, clamped into `0.0..=1.0`.
    #[must_use]
    pub fn with_popularity(mut self, popularity: f32) -> Self {
        self.popularity = if popularity.is_nan() {
            0.0
        } else {
            popularity.clamp(0.0, 1.0)
        };
        self
    }

    /// Mark the attraction as available or not.
    #[must_use]
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Check the record invariants.
    ///
    /// # Errors
    ///
    /// Returns the first broken invariant as an [`AttractionError`].
    pub fn validate(&self) -> Result<(), AttractionError> {
        if self.name.trim().is_empty() {
            return Err(AttractionError::EmptyName {
                id: self.id.clone(),
            });
        }
        if self.visit_duration.is_zero() {
            return Err(AttractionError::ZeroDuration {
                id: self.id.clone(),
            });
        }
        if !(0.0..=1.0).contains(&self.popularity) {
            return Err(AttractionError::InvalidPopularity {
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Opening intervals clipped to `day`, earliest first.
    ///
    /// Touching or overlapping intervals are merged, so `09:00-12:00` and
    /// `12:00-17:00` read as one `09:00-17:00` opening. An attraction without
    /// opening hours is open for the whole of `day`.
    #[must_use]
    pub fn open_during(&self, day: &TimeInterval) -> Vec<TimeInterval> {
        if self.opening_hours.is_empty() {
            return vec![*day];
        }
        let mut windows: Vec<TimeInterval> = self
            .opening_hours
            .iter()
            .filter_map(|interval| interval.intersect(day))
            .collect();
        windows.sort_unstable_by_key(TimeInterval::start);
        let mut merged: Vec<TimeInterval> = Vec::with_capacity(windows.len());
        for window in windows {
            match merged.last_mut() {
                Some(last) if window.start() <= last.end() => {
                    if window.end() > last.end()
                        && let Ok(joined) = TimeInterval::new(last.start(), window.end())
                    {
                        *last = joined;
                    }
                }
                _ => merged.push(window),
            }
        }
        merged
    }

    /// Whether `slot` lies inside one merged opening interval within `day`.
    #[must_use]
    pub fn is_open_for(&self, slot: &TimeInterval, day: &TimeInterval) -> bool {
        self.open_during(day)
            .iter()
            .any(|window| window.contains(slot))
    }
}
