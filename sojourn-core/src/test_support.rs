//! In-memory stand-ins for the engine's collaborators.
//!
//! These keep unit, behaviour and property tests free of network and disk
//! access. The implementations perform linear scans and are intended only
//! for small datasets.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;

use crate::{
    Attraction, AttractionId, CandidateSource, ConditionsSource, Currency, HistoryStore,
    InterestProfile, Location, Money, Penalties, Preference, SourceError, TravelError,
    TravelEstimator, TravelLeg, TravelMode, UserHistory,
};

/// Deterministic estimator charging the same time and fare for every hop.
///
/// Staying at the same location is free and instantaneous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTravelEstimator {
    duration: Duration,
    fare: Money,
    mode: TravelMode,
}

impl Default for FlatTravelEstimator {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(15 * 60),
            Money::from_minor(500, Currency::USD),
        )
    }
}

impl FlatTravelEstimator {
    /// Every hop takes `duration` and costs `fare`.
    #[must_use]
    pub const fn new(duration: Duration, fare: Money) -> Self {
        Self {
            duration,
            fare,
            mode: TravelMode::Walking,
        }
    }

    /// Report legs with `mode`.
    #[must_use]
    pub const fn with_mode(mut self, mode: TravelMode) -> Self {
        self.mode = mode;
        self
    }
}

impl TravelEstimator for FlatTravelEstimator {
    fn estimate(&self, from: &Location, to: &Location) -> Result<TravelLeg, TravelError> {
        if from.name == to.name {
            return Ok(TravelLeg::stationary(&from.name, self.fare.currency()));
        }
        Ok(
            TravelLeg::new(from.name.clone(), to.name.clone(), self.mode, self.duration)
                .with_cost(self.fare),
        )
    }
}

/// Estimator that always fails with the configured error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailingTravelEstimator(pub TravelError);

impl TravelEstimator for FailingTravelEstimator {
    fn estimate(&self, _from: &Location, _to: &Location) -> Result<TravelLeg, TravelError> {
        Err(self.0.clone())
    }
}

/// Catalogue serving a fixed list of attractions for any city.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    attractions: Vec<Attraction>,
    failure: Option<SourceError>,
}

impl MemoryCatalog {
    /// Serve `attractions`.
    pub fn with_attractions<I>(attractions: I) -> Self
    where
        I: IntoIterator<Item = Attraction>,
    {
        Self {
            attractions: attractions.into_iter().collect(),
            failure: None,
        }
    }

    /// Fail every request with `error`.
    #[must_use]
    pub const fn failing(error: SourceError) -> Self {
        Self {
            attractions: Vec::new(),
            failure: Some(error),
        }
    }
}

impl CandidateSource for MemoryCatalog {
    fn attractions_for(
        &self,
        _city: &str,
        _interests: &InterestProfile,
    ) -> Result<Vec<Attraction>, SourceError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.attractions.clone()),
        }
    }
}

/// Conditions source returning fixed penalties.
#[derive(Debug, Clone, Default)]
pub struct StaticConditions {
    result: Option<Result<Penalties, SourceError>>,
}

impl StaticConditions {
    /// Always return `penalties`.
    #[must_use]
    pub const fn new(penalties: Penalties) -> Self {
        Self {
            result: Some(Ok(penalties)),
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub const fn failing(error: SourceError) -> Self {
        Self {
            result: Some(Err(error)),
        }
    }
}

impl ConditionsSource for StaticConditions {
    fn penalties_for(
        &self,
        _city: &str,
        _date: NaiveDate,
        _candidates: &[Attraction],
    ) -> Result<Penalties, SourceError> {
        self.result.clone().unwrap_or_else(|| Ok(Penalties::none()))
    }
}

/// History store kept in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    users: Mutex<BTreeMap<String, UserHistory>>,
}

impl MemoryHistory {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `history` for `user`.
    #[must_use]
    pub fn with_user(user: &str, history: UserHistory) -> Self {
        Self {
            users: Mutex::new(BTreeMap::from([(user.to_owned(), history)])),
        }
    }

    fn with_users<R>(&self, f: impl FnOnce(&mut BTreeMap<String, UserHistory>) -> R) -> R {
        let mut guard = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl HistoryStore for MemoryHistory {
    fn preferences_for(&self, user: &str) -> Result<UserHistory, SourceError> {
        Ok(self.with_users(|users| users.get(user).cloned().unwrap_or_default()))
    }

    fn record_visit(
        &self,
        user: &str,
        city: &str,
        attractions: &[AttractionId],
    ) -> Result<(), SourceError> {
        self.with_users(|users| {
            users
                .entry(user.to_owned())
                .or_default()
                .visits
                .entry(city.to_owned())
                .or_default()
                .extend(attractions.iter().cloned());
        });
        Ok(())
    }

    fn record_preference(&self, user: &str, preference: &Preference) -> Result<(), SourceError> {
        self.with_users(|users| {
            let preferences = &mut users.entry(user.to_owned()).or_default().preferences;
            preferences.retain(|existing| existing.subject != preference.subject);
            preferences.insert(preference.clone());
        });
        Ok(())
    }
}
