//! Boundaries to the collaborators around the engine.
//!
//! The engine consumes an attraction catalogue, a conditions feed (weather
//! and local news) and a preference/history store. Each is a synchronous,
//! thread-safe trait so adapters can be swapped for in-memory stand-ins.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Attraction, AttractionId, Category, InterestProfile};

/// Failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The collaborator could not be reached.
    #[error("source unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
    /// The collaborator did not answer in time.
    #[error("source timed out after {timeout_secs}s")]
    Timeout {
        /// Timeout that elapsed, in seconds.
        timeout_secs: u64,
    },
    /// The collaborator answered with an HTTP error status.
    #[error("source answered HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message or body excerpt.
        message: String,
    },
    /// The answer could not be decoded.
    #[error("malformed source data: {message}")]
    Malformed {
        /// Description of the decoding failure.
        message: String,
    },
    /// The backing store failed.
    #[error("storage failure: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },
}

/// Names the collaborator behind an external failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collaborator {
    /// The travel estimator.
    TravelEstimator,
    /// The attraction catalogue.
    Catalog,
    /// The weather and news feed.
    Conditions,
    /// The preference and history store.
    History,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TravelEstimator => "travel estimator",
            Self::Catalog => "attraction catalogue",
            Self::Conditions => "conditions feed",
            Self::History => "history store",
        })
    }
}

/// Supplies candidate attractions for a city.
pub trait CandidateSource: Send + Sync {
    /// Attractions in `city`, optionally narrowed by `interests`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the catalogue cannot be read.
    fn attractions_for(
        &self,
        city: &str,
        interests: &InterestProfile,
    ) -> Result<Vec<Attraction>, SourceError>;
}

/// Rank adjustments derived from weather and local events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalties {
    /// Attractions that must not be scheduled.
    #[serde(default)]
    pub unavailable: BTreeSet<AttractionId>,
    /// Attractions that should be deprioritised.
    #[serde(default)]
    pub demoted: BTreeSet<AttractionId>,
    /// Practical advice for the day, such as bringing an umbrella.
    #[serde(default)]
    pub advice: Vec<String>,
}

impl Penalties {
    /// No penalties at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Combine two sets of penalties.
    ///
    /// An attraction both demoted and unavailable stays unavailable only.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.unavailable.extend(other.unavailable);
        self.demoted.extend(other.demoted);
        self.demoted.retain(|id| !self.unavailable.contains(id));
        for line in other.advice {
            if !self.advice.contains(&line) {
                self.advice.push(line);
            }
        }
        self
    }
}

/// Supplies weather and local-news penalties for a day.
pub trait ConditionsSource: Send + Sync {
    /// Penalties affecting `candidates` in `city` on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the feed cannot be read.
    fn penalties_for(
        &self,
        city: &str,
        date: NaiveDate,
        candidates: &[Attraction],
    ) -> Result<Penalties, SourceError>;
}

/// A conditions source that never penalises anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearConditions;

impl ConditionsSource for ClearConditions {
    fn penalties_for(
        &self,
        _city: &str,
        _date: NaiveDate,
        _candidates: &[Attraction],
    ) -> Result<Penalties, SourceError> {
        Ok(Penalties::none())
    }
}

/// Whether a traveller is drawn to or put off by something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// The traveller likes it.
    Likes,
    /// The traveller would rather avoid it.
    Dislikes,
}

/// What a preference is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceSubject {
    /// A whole category.
    Category(Category),
    /// A single attraction.
    Attraction(AttractionId),
}

/// A stored traveller preference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Preference {
    /// Subject of the preference.
    pub subject: PreferenceSubject,
    /// How the traveller feels about it.
    pub sentiment: Sentiment,
}

/// Everything the store remembers about a traveller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHistory {
    /// Visited attractions keyed by city.
    #[serde(default)]
    pub visits: BTreeMap<String, BTreeSet<AttractionId>>,
    /// Stated preferences.
    #[serde(default)]
    pub preferences: BTreeSet<Preference>,
}

impl UserHistory {
    /// Attractions previously visited in `city`.
    #[must_use]
    pub fn visited_in(&self, city: &str) -> BTreeSet<AttractionId> {
        self.visits.get(city).cloned().unwrap_or_default()
    }

    /// Categories with the given sentiment.
    #[must_use]
    pub fn categories(&self, sentiment: Sentiment) -> BTreeSet<Category> {
        self.preferences
            .iter()
            .filter(|preference| preference.sentiment == sentiment)
            .filter_map(|preference| match &preference.subject {
                PreferenceSubject::Category(category) => Some(*category),
                PreferenceSubject::Attraction(_) => None,
            })
            .collect()
    }

    /// Attractions with the given sentiment.
    #[must_use]
    pub fn attractions(&self, sentiment: Sentiment) -> BTreeSet<AttractionId> {
        self.preferences
            .iter()
            .filter(|preference| preference.sentiment == sentiment)
            .filter_map(|preference| match &preference.subject {
                PreferenceSubject::Attraction(id) => Some(id.clone()),
                PreferenceSubject::Category(_) => None,
            })
            .collect()
    }
}

/// Reads and records traveller preferences and visits.
///
/// Writes merge by key: recording the same visit or preference twice leaves
/// exactly one record.
pub trait HistoryStore: Send + Sync {
    /// Everything known about `user`; an unknown user has an empty history.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the store cannot be read.
    fn preferences_for(&self, user: &str) -> Result<UserHistory, SourceError>;

    /// Record that `user` visited `attractions` in `city`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the store cannot be written.
    fn record_visit(
        &self,
        user: &str,
        city: &str,
        attractions: &[AttractionId],
    ) -> Result<(), SourceError>;

    /// Record a stated preference, replacing an earlier sentiment about the
    /// same subject.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the store cannot be written.
    fn record_preference(&self, user: &str, preference: &Preference) -> Result<(), SourceError>;
}
