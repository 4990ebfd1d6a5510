//! Minute-resolution clock times and half-open intervals within one day.
//!
//! All scheduling arithmetic happens on whole minutes since local midnight.
//! Travel and visit durations arrive as [`Duration`] values and are rounded
//! up to the next minute when applied to a [`TimeOfDay`], so a 61 second leg
//! occupies two minutes of the schedule.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of minutes in a day; also the value of [`TimeOfDay::END_OF_DAY`].
pub const MINUTES_PER_DAY: u16 = 1440;

const SECONDS_PER_MINUTE: u64 = 60;

/// Errors raised while constructing times and intervals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// Input was not in `HH:MM` form.
    #[error("invalid time of day {input:?}; expected HH:MM")]
    InvalidFormat {
        /// Rejected input.
        input: String,
    },
    /// Minutes exceeded the end of the day.
    #[error("{minutes} minutes is past the end of the day")]
    OutOfRange {
        /// Rejected minute count.
        minutes: u32,
    },
    /// An interval whose end does not follow its start.
    #[error("interval {start}-{end} is empty")]
    EmptyInterval {
        /// Requested start.
        start: TimeOfDay,
        /// Requested end.
        end: TimeOfDay,
    },
}

/// Local wall-clock time at minute resolution.
///
/// `24:00` is representable so that intervals can end at midnight.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use sojourn_core::TimeOfDay;
///
/// let nine: TimeOfDay = "09:00".parse()?;
/// let later = nine.checked_add(Duration::from_secs(61)).expect("within the day");
/// assert_eq!(later.to_string(), "09:02");
/// # Ok::<(), sojourn_core::TimeError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Local midnight at the start of the day.
    pub const MIDNIGHT: Self = Self(0);
    /// Midnight at the end of the day (`24:00`).
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    /// Build a time from hours and minutes.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::OutOfRange`] when the result lies past `24:00`
    /// or `minute` is not below 60.
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, TimeError> {
        let minutes = u32::from(hour) * 60 + u32::from(minute);
        if minute >= 60 {
            return Err(TimeError::OutOfRange { minutes });
        }
        Self::from_minutes(minutes)
    }

    /// Build a time from minutes since midnight.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::OutOfRange`] for values above 1440.
    pub fn from_minutes(minutes: u32) -> Result<Self, TimeError> {
        u16::try_from(minutes)
            .ok()
            .filter(|m| *m <= MINUTES_PER_DAY)
            .map(Self)
            .ok_or(TimeError::OutOfRange { minutes })
    }

    /// Minutes elapsed since midnight.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    /// Advance by `duration`, rounding partial minutes up.
    ///
    /// Returns `None` when the result would pass `24:00`.
    #[must_use]
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let added = u64::from(self.0).checked_add(whole_minutes(duration))?;
        u16::try_from(added)
            .ok()
            .filter(|m| *m <= MINUTES_PER_DAY)
            .map(Self)
    }

    /// Time elapsed from `self` until `later`, or zero if `later` is earlier.
    #[must_use]
    pub fn until(self, later: Self) -> Duration {
        let minutes = later.0.saturating_sub(self.0);
        Duration::from_secs(u64::from(minutes) * SECONDS_PER_MINUTE)
    }
}

/// Minutes a duration occupies on the schedule, rounding up.
#[must_use]
pub fn whole_minutes(duration: Duration) -> u64 {
    let seconds = duration
        .as_secs()
        .saturating_add(u64::from(duration.subsec_nanos() > 0));
    seconds.div_ceil(SECONDS_PER_MINUTE)
}

impl fmt::Display for TimeOfDay {
    #[expect(
        clippy::integer_division,
        clippy::integer_division_remainder_used,
        reason = "splitting minutes into hours and minutes is exact"
    )]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "24:00" {
            return Ok(Self::END_OF_DAY);
        }
        let parsed =
            NaiveTime::parse_from_str(trimmed, "%H:%M").map_err(|_| TimeError::InvalidFormat {
                input: s.to_owned(),
            })?;
        Self::from_minutes(parsed.hour() * 60 + parsed.minute())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Half-open interval `[start, end)` with `start < end`.
///
/// # Examples
/// ```
/// use sojourn_core::TimeInterval;
///
/// let opening: TimeInterval = "09:00-17:00".parse()?;
/// let visit: TimeInterval = "10:00-11:30".parse()?;
/// assert!(opening.contains(&visit));
/// assert_eq!(visit.duration().as_secs(), 90 * 60);
/// # Ok::<(), sojourn_core::TimeError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IntervalRecord")]
pub struct TimeInterval {
    start: TimeOfDay,
    end: TimeOfDay,
}

#[derive(Deserialize)]
struct IntervalRecord {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TryFrom<IntervalRecord> for TimeInterval {
    type Error = TimeError;

    fn try_from(value: IntervalRecord) -> Result<Self, Self::Error> {
        Self::new(value.start, value.end)
    }
}

impl TimeInterval {
    /// The whole day, `00:00-24:00`.
    pub const WHOLE_DAY: Self = Self {
        start: TimeOfDay::MIDNIGHT,
        end: TimeOfDay::END_OF_DAY,
    };

    /// Validate and build an interval.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::EmptyInterval`] unless `start < end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, TimeError> {
        if start >= end {
            return Err(TimeError::EmptyInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build an interval of `duration` starting at `start`.
    ///
    /// Returns `None` for a zero duration or when the interval would run
    /// past the end of the day.
    #[must_use]
    pub fn starting_at(start: TimeOfDay, duration: Duration) -> Option<Self> {
        let end = start.checked_add(duration)?;
        Self::new(start, end).ok()
    }

    /// Inclusive start.
    #[must_use]
    pub const fn start(&self) -> TimeOfDay {
        self.start
    }

    /// Exclusive end.
    #[must_use]
    pub const fn end(&self) -> TimeOfDay {
        self.end
    }

    /// Length of the interval.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.start.until(self.end)
    }

    /// Whether `other` lies entirely within `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two intervals share at least one minute.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The common part of two intervals, if any.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        Self::new(start, end).ok()
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for TimeInterval {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s.split_once('-').ok_or_else(|| TimeError::InvalidFormat {
            input: s.to_owned(),
        })?;
        Self::new(start.parse()?, end.parse()?)
    }
}
