//! Property-based tests for the itinerary engine.
//!
//! # Invariants tested
//!
//! - **Validity:** every planned itinerary passes the validator.
//! - **Budget compliance:** total cost never exceeds the cap.
//! - **Determinism:** identical inputs produce identical outcomes.
//! - **Idempotence:** restating the budget returns an equal itinerary.
//! - **Monotonicity:** tightening the budget never adds stops or cost.
//! - **Non-destruction:** adjustments leave their input untouched.


use std::collections::HashSet;

use proptest::prelude::*;
use sojourn_core::test_support::FlatTravelEstimator;
use sojourn_core::{
    AdjustmentRequest, Attraction, BuildOutcome, EntryRef, Itinerary, Money, validate,
};
use sojourn_planner::{ItineraryEngine, PlanRequest, RankingContext};

use proptest_support::{attraction_set, hour_interval, plan_request};

fn engine() -> ItineraryEngine<FlatTravelEstimator> {
    ItineraryEngine::new(FlatTravelEstimator::default())
}

fn plan(request: &PlanRequest, attractions: Vec<Attraction>) -> BuildOutcome {
    match engine().build(request, attractions, &RankingContext::default()) {
        Ok(outcome) => outcome,
        Err(err) => panic!("engine failed: {err}"),
    }
}

fn adjust(itinerary: &Itinerary, request: &AdjustmentRequest) -> BuildOutcome {
    match engine().adjust(itinerary, request) {
        Ok(outcome) => outcome,
        Err(err) => panic!("adjustment failed: {err}"),
    }
}

#[expect(
    clippy::integer_division,
    reason = "test caps are rounded-down shares of small totals"
)]
const fn share(minor: u64, percent: u64) -> u64 {
    minor * percent / 100
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: whatever the builder plans satisfies every invariant.
    #[test]
    fn planned_days_are_valid(
        request in plan_request(),
        attractions in attraction_set(8),
    ) {
        if let BuildOutcome::Planned(itinerary) = plan(&request, attractions) {
            prop_assert_eq!(validate(&itinerary), Ok(()));
            if let Some(budget) = request.budget {
                prop_assert!(itinerary.total_cost().minor() <= budget.minor());
            }
            let ids = itinerary.visited_ids();
            let unique: HashSet<_> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());
        }
    }

    /// Property: building twice from the same inputs gives the same answer.
    #[test]
    fn builds_are_deterministic(
        request in plan_request(),
        attractions in attraction_set(8),
    ) {
        let first = plan(&request, attractions.clone());
        let second = plan(&request, attractions);
        prop_assert_eq!(first, second);
    }

    /// Property: restating the current cap changes nothing.
    #[test]
    fn restating_the_budget_is_idempotent(
        request in plan_request(),
        attractions in attraction_set(8),
    ) {
        if let BuildOutcome::Planned(itinerary) = plan(&request, attractions) {
            let restated = AdjustmentRequest::ChangeBudget {
                budget: itinerary.constraints().budget,
            };
            let outcome = adjust(&itinerary, &restated);
            prop_assert_eq!(outcome.itinerary(), Some(&itinerary));
        }
    }

    /// Property: a tighter cap never adds stops or cost, and the input
    /// itinerary is left as it was.
    #[test]
    fn tightening_the_budget_is_monotone(
        request in plan_request(),
        attractions in attraction_set(8),
        percent in 0_u64..=100,
    ) {
        if let BuildOutcome::Planned(itinerary) = plan(&request, attractions) {
            let before = itinerary.clone();
            let total = itinerary.total_cost();
            let cap = Money::from_minor(share(total.minor(), percent), total.currency());
            let outcome = adjust(&itinerary, &AdjustmentRequest::ChangeBudget { budget: Some(cap) });
            prop_assert_eq!(&itinerary, &before);
            if let Some(tighter) = outcome.itinerary() {
                prop_assert_eq!(validate(tighter), Ok(()));
                prop_assert!(tighter.visit_count() <= itinerary.visit_count());
                prop_assert!(tighter.total_cost().minor() <= cap.minor());
                prop_assert!(tighter.total_cost().minor() <= total.minor());
            }
        }
    }

    /// Property: every adjustment that still plans a day yields a valid one.
    #[test]
    fn adjustments_stay_valid(
        request in plan_request(),
        attractions in attraction_set(8),
        window in hour_interval(8, 14, 8),
        position in 0_usize..8,
    ) {
        if let BuildOutcome::Planned(itinerary) = plan(&request, attractions) {
            let position = itinerary.entries().len().saturating_sub(1).min(position);
            let requests = [
                AdjustmentRequest::RemoveStop { target: EntryRef::Position(position) },
                AdjustmentRequest::ChangeWindow { window },
                AdjustmentRequest::ChangeBudget { budget: None },
            ];
            for adjustment in &requests {
                if let Some(adjusted) = adjust(&itinerary, adjustment).itinerary() {
                    prop_assert_eq!(validate(adjusted), Ok(()));
                }
            }
        }
    }
}
