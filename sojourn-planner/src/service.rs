//! Orchestration over the engine's collaborators.
//!
//! [`TourPlanner`] gathers candidates, penalties and history, hands them to
//! an [`ItineraryEngine`] and records what was planned. Any collaborator
//! failure aborts the call; no partial itinerary is returned.

use sojourn_core::{
    AdjustmentRequest, BuildOutcome, CandidateSource, Collaborator, ConditionsSource,
    HistoryStore, Itinerary, SourceError, TravelError, TravelEstimator,
};
use thiserror::Error;

use crate::{
    AdjustError, EngineError, HistoryHints, ItineraryEngine, PlanRequest, PlannerConfig,
    RankingContext, RequestError,
};

/// A finished planning call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanReport {
    /// The plan, or why none exists.
    pub outcome: BuildOutcome,
    /// Practical advice from the conditions feed.
    pub advice: Vec<String>,
}

/// Errors returned by [`TourPlanner`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// A collaborator failed.
    #[error("{collaborator} failed: {source}")]
    ExternalSource {
        /// Which collaborator failed.
        collaborator: Collaborator,
        /// Underlying failure.
        #[source]
        source: SourceError,
    },
    /// Travel estimates could not be obtained.
    #[error("travel estimation failed: {0}")]
    Travel(#[source] TravelError),
    /// The request was rejected.
    #[error(transparent)]
    Request(RequestError),
    /// The adjustment does not apply.
    #[error(transparent)]
    Adjust(AdjustError),
}

impl PlanError {
    /// The collaborator behind the failure, if any.
    #[must_use]
    pub const fn collaborator(&self) -> Option<Collaborator> {
        match self {
            Self::ExternalSource { collaborator, .. } => Some(*collaborator),
            Self::Travel(_) => Some(Collaborator::TravelEstimator),
            Self::Request(_) | Self::Adjust(_) => None,
        }
    }

    fn external(collaborator: Collaborator) -> impl Fn(SourceError) -> Self {
        move |source| Self::ExternalSource {
            collaborator,
            source,
        }
    }
}

impl From<EngineError> for PlanError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Request(inner) => Self::Request(inner),
            EngineError::Travel(inner) => Self::Travel(inner),
            EngineError::Adjust(inner) => Self::Adjust(inner),
        }
    }
}

/// Plans days end to end over the four collaborator ports.
///
/// The planner is generic over its boundaries: a catalogue, a conditions
/// feed, a travel estimator and a history store.
pub struct TourPlanner<C, W, T, H>
where
    C: CandidateSource,
    W: ConditionsSource,
    T: TravelEstimator,
    H: HistoryStore,
{
    catalog: C,
    conditions: W,
    engine: ItineraryEngine<T>,
    history: H,
}

impl<C, W, T, H> TourPlanner<C, W, T, H>
where
    C: CandidateSource,
    W: ConditionsSource,
    T: TravelEstimator,
    H: HistoryStore,
{
    /// Planner using the default configuration.
    #[must_use]
    pub fn new(catalog: C, conditions: W, estimator: T, history: H) -> Self {
        Self::with_config(catalog, conditions, estimator, history, PlannerConfig::default())
    }

    /// Planner with an explicit configuration.
    #[must_use]
    pub const fn with_config(
        catalog: C,
        conditions: W,
        estimator: T,
        history: H,
        config: PlannerConfig,
    ) -> Self {
        Self {
            catalog,
            conditions,
            engine: ItineraryEngine::with_config(estimator, config),
            history,
        }
    }

    /// The engine doing the scheduling.
    #[must_use]
    pub const fn engine(&self) -> &ItineraryEngine<T> {
        &self.engine
    }

    /// Plan the day described by `request`.
    ///
    /// When a user is named, their history shapes the ranking and the
    /// planned visits are recorded afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::ExternalSource`] when a collaborator fails and
    /// the engine's errors otherwise.
    pub fn plan(&self, request: &PlanRequest) -> Result<PlanReport, PlanError> {
        let candidates = self
            .catalog
            .attractions_for(&request.city, &request.interests)
            .map_err(PlanError::external(Collaborator::Catalog))?;
        let penalties = self
            .conditions
            .penalties_for(&request.city, request.date, &candidates)
            .map_err(PlanError::external(Collaborator::Conditions))?;
        let hints = match request.user.as_deref() {
            Some(user) => {
                let history = self
                    .history
                    .preferences_for(user)
                    .map_err(PlanError::external(Collaborator::History))?;
                HistoryHints::from_history(&history, &request.city)
            }
            None => HistoryHints::default(),
        };
        log::info!(
            "planning {} on {} from {} candidates",
            request.city,
            request.date,
            candidates.len()
        );

        let advice = penalties.advice.clone();
        let context = RankingContext { penalties, hints };
        let outcome = self.engine.build(request, candidates, &context)?;
        if let (Some(user), Some(itinerary)) = (request.user.as_deref(), outcome.itinerary()) {
            self.record(user, itinerary)?;
        }
        Ok(PlanReport { outcome, advice })
    }

    /// Apply `request` to `itinerary`, recording the result for `user`.
    ///
    /// # Errors
    ///
    /// Returns the engine's errors, or [`PlanError::ExternalSource`] when the
    /// adjusted plan cannot be recorded.
    pub fn adjust(
        &self,
        user: Option<&str>,
        itinerary: &Itinerary,
        request: &AdjustmentRequest,
    ) -> Result<BuildOutcome, PlanError> {
        let outcome = self.engine.adjust(itinerary, request)?;
        if let (Some(user), Some(adjusted)) = (user, outcome.itinerary()) {
            self.record(user, adjusted)?;
        }
        Ok(outcome)
    }

    fn record(&self, user: &str, itinerary: &Itinerary) -> Result<(), PlanError> {
        let city = &itinerary.constraints().city;
        self.history
            .record_visit(user, city, &itinerary.visited_ids())
            .map_err(PlanError::external(Collaborator::History))?;
        log::debug!("recorded {} visits in {city} for {user}", itinerary.visit_count());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use rstest::{fixture, rstest};
    use sojourn_core::test_support::{
        FailingTravelEstimator, FlatTravelEstimator, MemoryCatalog, MemoryHistory,
        StaticConditions,
    };
    use sojourn_core::{
        Attraction, AttractionId, Category, Currency, EntryRef, Location, Money,
        Penalties, Preference, PreferenceSubject, Sentiment, UserHistory,
    };

    use super::*;

    struct BrokenHistory;

    impl HistoryStore for BrokenHistory {
        fn preferences_for(&self, _user: &str) -> Result<UserHistory, SourceError> {
            Err(SourceError::Storage {
                message: "disk full".into(),
            })
        }

        fn record_visit(
            &self,
            _user: &str,
            _city: &str,
            _attractions: &[AttractionId],
        ) -> Result<(), SourceError> {
            Err(SourceError::Storage {
                message: "disk full".into(),
            })
        }

        fn record_preference(
            &self,
            _user: &str,
            _preference: &Preference,
        ) -> Result<(), SourceError> {
            Ok(())
        }
    }

    fn attraction(id: &str, category: Category) -> Attraction {
        Attraction::new(
            id,
            id,
            category,
            Location::named(id),
            Duration::from_secs(60 * 60),
            Money::from_minor(1000, Currency::USD),
        )
        .expect("attraction")
        .with_opening_hours(vec!["09:00-18:00".parse().expect("hours")])
    }

    #[fixture]
    fn catalog() -> MemoryCatalog {
        MemoryCatalog::with_attractions([
            attraction("museum", Category::History),
            attraction("garden", Category::Nature),
        ])
    }

    #[fixture]
    fn request() -> PlanRequest {
        PlanRequest::new(
            "Springfield",
            NaiveDate::from_ymd_opt(2025, 6, 1).expect("date"),
            "09:00-12:00".parse().expect("window"),
            Location::named("hotel"),
        )
        .for_user("ada")
    }

    #[rstest]
    fn records_planned_visits(catalog: MemoryCatalog, request: PlanRequest) {
        let planner = TourPlanner::new(
            catalog,
            StaticConditions::default(),
            FlatTravelEstimator::default(),
            MemoryHistory::new(),
        );
        let report = planner.plan(&request).expect("report");
        assert!(report.outcome.is_planned());
        let history = planner.history.preferences_for("ada").expect("history");
        assert_eq!(history.visited_in("Springfield").len(), 2);
    }

    #[rstest]
    fn anonymous_plans_are_not_recorded(catalog: MemoryCatalog, mut request: PlanRequest) {
        request.user = None;
        let planner = TourPlanner::new(
            catalog,
            StaticConditions::default(),
            FlatTravelEstimator::default(),
            BrokenHistory,
        );
        let report = planner.plan(&request).expect("report");
        assert!(report.outcome.is_planned());
    }

    #[rstest]
    fn advice_and_penalties_flow_through(catalog: MemoryCatalog, request: PlanRequest) {
        let penalties = Penalties {
            unavailable: [AttractionId::from("garden")].into(),
            advice: vec!["Bring an umbrella".into()],
            ..Penalties::default()
        };
        let planner = TourPlanner::new(
            catalog,
            StaticConditions::new(penalties),
            FlatTravelEstimator::default(),
            MemoryHistory::new(),
        );
        let report = planner.plan(&request).expect("report");
        assert_eq!(report.advice, ["Bring an umbrella"]);
        let itinerary = report.outcome.itinerary().expect("planned");
        assert_eq!(itinerary.visited_ids(), [AttractionId::from("museum")]);
    }

    #[rstest]
    fn disliked_attractions_are_left_out(catalog: MemoryCatalog, request: PlanRequest) {
        let history = UserHistory {
            preferences: [Preference {
                subject: PreferenceSubject::Attraction("museum".into()),
                sentiment: Sentiment::Dislikes,
            }]
            .into(),
            ..UserHistory::default()
        };
        let planner = TourPlanner::new(
            catalog,
            StaticConditions::default(),
            FlatTravelEstimator::default(),
            MemoryHistory::with_user("ada", history),
        );
        let report = planner.plan(&request).expect("report");
        let itinerary = report.outcome.itinerary().expect("planned");
        assert_eq!(itinerary.visited_ids(), [AttractionId::from("garden")]);
    }

    #[rstest]
    #[case::catalog(
        MemoryCatalog::failing(SourceError::Unavailable { message: "down".into() }),
        StaticConditions::default(),
        Collaborator::Catalog
    )]
    #[case::conditions(
        MemoryCatalog::with_attractions([attraction("museum", Category::History)]),
        StaticConditions::failing(SourceError::Timeout { timeout_secs: 5 }),
        Collaborator::Conditions
    )]
    fn collaborator_failures_abort(
        #[case] catalog: MemoryCatalog,
        #[case] conditions: StaticConditions,
        #[case] expected: Collaborator,
        request: PlanRequest,
    ) {
        let planner = TourPlanner::new(
            catalog,
            conditions,
            FlatTravelEstimator::default(),
            MemoryHistory::new(),
        );
        let err = planner.plan(&request).expect_err("failure");
        assert_eq!(err.collaborator(), Some(expected));
    }

    #[rstest]
    fn history_failures_abort(catalog: MemoryCatalog, request: PlanRequest) {
        let planner = TourPlanner::new(
            catalog,
            StaticConditions::default(),
            FlatTravelEstimator::default(),
            BrokenHistory,
        );
        let err = planner.plan(&request).expect_err("failure");
        assert_eq!(err.collaborator(), Some(Collaborator::History));
    }

    #[rstest]
    fn travel_failures_name_the_estimator(catalog: MemoryCatalog, request: PlanRequest) {
        let planner = TourPlanner::new(
            catalog,
            StaticConditions::default(),
            FailingTravelEstimator(TravelError::EmptyInput),
            MemoryHistory::new(),
        );
        let err = planner.plan(&request).expect_err("failure");
        assert_eq!(err, PlanError::Travel(TravelError::EmptyInput));
        assert_eq!(err.collaborator(), Some(Collaborator::TravelEstimator));
    }

    #[rstest]
    fn adjustments_are_recorded(catalog: MemoryCatalog, request: PlanRequest) {
        let planner = TourPlanner::new(
            catalog,
            StaticConditions::default(),
            FlatTravelEstimator::default(),
            MemoryHistory::new(),
        );
        let mut anonymous = request.clone();
        anonymous.user = None;
        let itinerary = planner
            .plan(&anonymous)
            .expect("report")
            .outcome
            .into_itinerary()
            .expect("planned");
        let outcome = planner
            .adjust(
                Some("ada"),
                &itinerary,
                &AdjustmentRequest::RemoveStop {
                    target: EntryRef::Position(0),
                },
            )
            .expect("adjusted");
        assert_eq!(outcome.itinerary().map(Itinerary::visit_count), Some(1));
        let history = planner.history.preferences_for("ada").expect("history");
        assert_eq!(history.visited_in("Springfield").len(), 1);
    }
}
