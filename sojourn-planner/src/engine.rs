//! The itinerary engine: travel prefetch, solver and validation.
//!
//! [`ItineraryEngine`] wraps the pure builder and adjuster. It asks its
//! [`TravelEstimator`] for every leg a request may need up front, runs the
//! solver against that matrix and checks the result before handing it back.
//! An engine holds no mutable state, so one instance can serve many threads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sojourn_core::{
    Activity, AdjustmentRequest, Attraction, BuildOutcome, Currency, Infeasible, InfeasibleReason,
    InterestProfile, Itinerary, Location, Money, Penalties, PlanConstraints, TimeInterval,
    TravelError, TravelEstimator, TravelMatrix, Violation, validate,
};
use thiserror::Error;

use crate::{
    AdjustError, CandidatePoolBuilder, HistoryHints, PlannerConfig, ScheduleAdjuster,
    ScheduleBuilder,
};

/// A request for a new day plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Destination city.
    pub city: String,
    /// Day being planned.
    pub date: NaiveDate,
    /// Time available for sightseeing.
    pub window: TimeInterval,
    /// Where the day starts.
    pub start: Location,
    /// Spending cap covering activities and travel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Money>,
    /// Currency the plan is priced in; defaults to the budget's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    /// Traveller interests.
    #[serde(default)]
    pub interests: InterestProfile,
    /// Traveller whose history should shape the plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl PlanRequest {
    /// Request without a budget, interests or user.
    #[must_use]
    pub fn new(
        city: impl Into<String>,
        date: NaiveDate,
        window: TimeInterval,
        start: Location,
    ) -> Self {
        Self {
            city: city.into(),
            date,
            window,
            start,
            budget: None,
            currency: None,
            interests: InterestProfile::default(),
            user: None,
        }
    }

    /// Cap spending at `budget`.
    #[must_use]
    pub fn with_budget(mut self, budget: Money) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Weight the ranking with `interests`.
    #[must_use]
    pub fn with_interests(mut self, interests: InterestProfile) -> Self {
        self.interests = interests;
        self
    }

    /// Plan on behalf of `user`.
    #[must_use]
    pub fn for_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// The plan currency: explicit, else the budget's, else the default.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
            .or_else(|| self.budget.map(|budget| budget.currency()))
            .unwrap_or_default()
    }

    /// The constraints recorded on the resulting itinerary.
    #[must_use]
    pub fn constraints(&self) -> PlanConstraints {
        PlanConstraints {
            city: self.city.clone(),
            date: self.date,
            window: self.window,
            budget: self.budget,
            start: self.start.clone(),
            currency: self.currency(),
        }
    }
}

/// Ranking inputs gathered from the conditions feed and history store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingContext {
    /// Weather and news penalties.
    pub penalties: Penalties,
    /// Hints from the traveller's history.
    pub hints: HistoryHints,
}

/// Requests the engine refuses to act on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// An amount is priced in a currency other than the plan's.
    #[error("expected amounts in {expected}, found {found}")]
    CurrencyMismatch {
        /// Plan currency.
        expected: Currency,
        /// Offending currency.
        found: Currency,
    },
    /// The itinerary to adjust is already broken.
    #[error("itinerary to adjust is invalid: {0}")]
    InvalidItinerary(Violation),
}

/// Errors returned by [`ItineraryEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The request was rejected before solving.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// Travel estimates could not be obtained.
    #[error("travel estimation failed: {0}")]
    Travel(#[from] TravelError),
    /// The adjustment does not apply to the itinerary.
    #[error(transparent)]
    Adjust(#[from] AdjustError),
}

/// Builds and adjusts itineraries against a travel estimator.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use sojourn_core::test_support::FlatTravelEstimator;
/// use sojourn_core::{Attraction, Category, Currency, Location, Money};
/// use sojourn_planner::{ItineraryEngine, PlanRequest, RankingContext};
/// use std::time::Duration;
///
/// let engine = ItineraryEngine::new(FlatTravelEstimator::default());
/// let museum = Attraction::new(
///     "museum",
///     "City Museum",
///     Category::History,
///     Location::named("museum"),
///     Duration::from_secs(3600),
///     Money::from_minor(1200, Currency::USD),
/// )?;
/// let request = PlanRequest::new(
///     "Springfield",
///     NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default(),
///     "09:00-17:00".parse()?,
///     Location::named("hotel"),
/// );
/// let outcome = engine.build(&request, vec![museum], &RankingContext::default())?;
/// assert!(outcome.is_planned());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct ItineraryEngine<T: TravelEstimator> {
    estimator: T,
    config: PlannerConfig,
}

impl<T: TravelEstimator> ItineraryEngine<T> {
    /// Engine with the default [`PlannerConfig`].
    #[must_use]
    pub fn new(estimator: T) -> Self {
        Self::with_config(estimator, PlannerConfig::default())
    }

    /// Engine with an explicit configuration.
    #[must_use]
    pub const fn with_config(estimator: T, config: PlannerConfig) -> Self {
        Self { estimator, config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The travel estimator in use.
    #[must_use]
    pub const fn estimator(&self) -> &T {
        &self.estimator
    }

    /// Build a plan for `request` from the raw catalogue answer.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Request`] when the budget is priced in another
    /// currency or the estimator prices legs in another currency, and
    /// [`EngineError::Travel`] when travel estimates cannot be fetched.
    /// An impossible day is [`BuildOutcome::Infeasible`], not an error.
    pub fn build(
        &self,
        request: &PlanRequest,
        candidates: Vec<Attraction>,
        context: &RankingContext,
    ) -> Result<BuildOutcome, EngineError> {
        let constraints = request.constraints();
        if let Some(budget) = request.budget {
            same_currency(constraints.currency, budget.currency())?;
        }
        let pool = CandidatePoolBuilder::new(self.config.weights).build(
            candidates,
            &request.interests,
            &context.penalties,
            &context.hints,
        );
        log::debug!(
            "pool for {} holds {} candidates, {} dropped",
            request.city,
            pool.len(),
            pool.dropped().len()
        );
        let matrix = if pool.is_empty() {
            TravelMatrix::new()
        } else {
            let mut locations = Vec::with_capacity(pool.len() + 1);
            locations.push(constraints.start.clone());
            locations.extend(pool.candidates().iter().map(|a| a.location.clone()));
            self.prefetch(&locations, constraints.currency)?
        };
        let outcome =
            ScheduleBuilder::new(self.config.meal_break).build(&pool, &constraints, &matrix);
        Ok(checked(outcome))
    }

    /// Apply `request` to `itinerary`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidItinerary`] when `itinerary` breaks an
    /// invariant, [`EngineError::Adjust`] when the request does not apply and
    /// [`EngineError::Travel`] when travel estimates cannot be fetched.
    pub fn adjust(
        &self,
        itinerary: &Itinerary,
        request: &AdjustmentRequest,
    ) -> Result<BuildOutcome, EngineError> {
        validate(itinerary).map_err(RequestError::InvalidItinerary)?;
        let constraints = itinerary.constraints();
        let mut locations = vec![constraints.start.clone()];
        locations.extend(
            itinerary
                .entries()
                .iter()
                .filter(|entry| matches!(entry.activity, Activity::Visit(_)))
                .map(|entry| entry.activity.location().clone()),
        );
        match request {
            AdjustmentRequest::ReplaceStart { start } => locations.push(start.clone()),
            AdjustmentRequest::InsertStop { attraction, .. } => {
                locations.push(attraction.location.clone());
            }
            AdjustmentRequest::RemoveStop { .. }
            | AdjustmentRequest::MoveTime { .. }
            | AdjustmentRequest::ChangeBudget { .. }
            | AdjustmentRequest::ChangeWindow { .. } => {}
        }
        let matrix = self.prefetch(&locations, constraints.currency)?;
        let outcome = ScheduleAdjuster.adjust(itinerary, request, &matrix)?;
        Ok(checked(outcome))
    }

    fn prefetch(
        &self,
        locations: &[Location],
        currency: Currency,
    ) -> Result<TravelMatrix, EngineError> {
        let matrix = self.estimator.estimate_matrix(locations)?;
        if let Some(leg) = matrix.foreign_leg(currency) {
            return Err(RequestError::CurrencyMismatch {
                expected: currency,
                found: leg.cost.currency(),
            }
            .into());
        }
        log::debug!("prefetched {} travel legs", matrix.len());
        Ok(matrix)
    }
}

fn same_currency(expected: Currency, found: Currency) -> Result<(), RequestError> {
    if expected == found {
        Ok(())
    } else {
        Err(RequestError::CurrencyMismatch { expected, found })
    }
}

/// Run the validator over a planned outcome.
fn checked(outcome: BuildOutcome) -> BuildOutcome {
    let BuildOutcome::Planned(itinerary) = outcome else {
        return outcome;
    };
    match validate(&itinerary) {
        Ok(()) => BuildOutcome::Planned(itinerary),
        Err(violation) => {
            log::error!("discarding itinerary for {}: {violation}", itinerary.constraints().city);
            BuildOutcome::Infeasible(
                Infeasible::new(
                    InfeasibleReason::InvariantViolated(violation.clone()),
                    violation.to_string(),
                )
                .with_excluded(itinerary.excluded().to_vec()),
            )
        }
    }
}
