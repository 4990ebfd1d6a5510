//! Candidate pool construction.
//!
//! Turns the raw catalogue answer into a filtered, ranked list. The builder
//! is a pure function of its inputs; an empty pool is an ordinary value.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use sojourn_core::{
    Attraction, AttractionId, Category, InterestProfile, Penalties, Sentiment, UserHistory,
};

use crate::RankWeights;

/// Soft ranking hints and hard exclusions derived from a traveller's history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryHints {
    /// Attractions already visited in the plan city.
    pub visited: BTreeSet<AttractionId>,
    /// Categories the traveller likes.
    pub liked_categories: BTreeSet<Category>,
    /// Categories the traveller would rather avoid.
    pub disliked_categories: BTreeSet<Category>,
    /// Individual attractions the traveller likes.
    pub liked: BTreeSet<AttractionId>,
    /// Attractions the caller wants left out entirely.
    pub excluded: BTreeSet<AttractionId>,
}

impl HistoryHints {
    /// Hints for a plan in `city` derived from `history`.
    ///
    /// Disliked attractions become hard exclusions; previous visits only
    /// lower the rank.
    #[must_use]
    pub fn from_history(history: &UserHistory, city: &str) -> Self {
        Self {
            visited: history.visited_in(city),
            liked_categories: history.categories(Sentiment::Likes),
            disliked_categories: history.categories(Sentiment::Dislikes),
            liked: history.attractions(Sentiment::Likes),
            excluded: history.attractions(Sentiment::Dislikes),
        }
    }

    /// Also exclude `ids`.
    #[must_use]
    pub fn excluding<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = AttractionId>,
    {
        self.excluded.extend(ids);
        self
    }
}

/// Ranked candidates plus the identifiers filtered out on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePool {
    candidates: Vec<Attraction>,
    dropped: Vec<AttractionId>,
}

impl CandidatePool {
    /// Candidates in rank order, each with its rank filled in.
    #[must_use]
    pub fn candidates(&self) -> &[Attraction] {
        &self.candidates
    }

    /// Attractions removed by hard exclusions or invalid records.
    #[must_use]
    pub fn dropped(&self) -> &[AttractionId] {
        &self.dropped
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no candidate survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Filters and ranks raw attractions.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use sojourn_core::{Attraction, Category, Currency, InterestProfile, Location, Money, Penalties};
/// use sojourn_planner::{CandidatePoolBuilder, HistoryHints, RankWeights};
///
/// let make = |id: &str, category| {
///     Attraction::new(id, id, category, Location::named(id), Duration::from_secs(3600),
///         Money::zero(Currency::USD))
/// };
/// let interests = InterestProfile::new().with_weight(Category::Art, 0.9);
/// let pool = CandidatePoolBuilder::new(RankWeights::default()).build(
///     vec![make("park", Category::Nature)?, make("gallery", Category::Art)?],
///     &interests,
///     &Penalties::none(),
///     &HistoryHints::default(),
/// );
/// assert_eq!(pool.candidates()[0].id.as_str(), "gallery");
/// # Ok::<(), sojourn_core::AttractionError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidatePoolBuilder {
    weights: RankWeights,
}

impl CandidatePoolBuilder {
    /// Builder ranking with `weights`.
    #[must_use]
    pub const fn new(weights: RankWeights) -> Self {
        Self { weights }
    }

    /// Filter and rank `attractions`.
    ///
    /// Duplicate identifiers keep their first occurrence. Unavailable,
    /// penalised-as-unavailable, excluded and malformed records are dropped.
    #[must_use]
    pub fn build(
        &self,
        attractions: Vec<Attraction>,
        interests: &InterestProfile,
        penalties: &Penalties,
        hints: &HistoryHints,
    ) -> CandidatePool {
        let mut seen = HashSet::new();
        let mut candidates = Vec::with_capacity(attractions.len());
        let mut dropped = Vec::new();
        for mut attraction in attractions {
            if !seen.insert(attraction.id.clone()) {
                log::debug!("ignoring duplicate catalogue record {}", attraction.id);
                continue;
            }
            if let Err(err) = attraction.validate() {
                log::warn!("dropping malformed attraction: {err}");
                dropped.push(attraction.id);
                continue;
            }
            if !attraction.available
                || penalties.unavailable.contains(&attraction.id)
                || hints.excluded.contains(&attraction.id)
            {
                log::debug!("excluding unavailable attraction {}", attraction.id);
                dropped.push(attraction.id);
                continue;
            }
            attraction.rank = self.rank(&attraction, interests, penalties, hints);
            candidates.push(attraction);
        }
        candidates.sort_by(rank_order);
        log::debug!(
            "candidate pool holds {} attractions, {} dropped",
            candidates.len(),
            dropped.len()
        );
        CandidatePool {
            candidates,
            dropped,
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "rank scores are weighted sums of floating-point signals"
    )]
    fn rank(
        &self,
        attraction: &Attraction,
        interests: &InterestProfile,
        penalties: &Penalties,
        hints: &HistoryHints,
    ) -> f32 {
        let weights = &self.weights;
        let interest = interests
            .weight(attraction.category)
            .unwrap_or(weights.unmatched_interest);
        let mut rank = weights.interest * interest + weights.popularity * attraction.popularity;
        if hints.liked.contains(&attraction.id)
            || hints.liked_categories.contains(&attraction.category)
        {
            rank += weights.liked;
        }
        if hints.disliked_categories.contains(&attraction.category) {
            rank -= weights.disliked;
        }
        if penalties.demoted.contains(&attraction.id) {
            rank -= weights.weather_demotion;
        }
        if hints.visited.contains(&attraction.id) {
            rank -= weights.repeat_visit;
        }
        rank
    }
}

/// Candidate order: rank descending, then cost, name and id ascending.
#[must_use]
pub fn rank_order(lhs: &Attraction, rhs: &Attraction) -> Ordering {
    rhs.rank
        .total_cmp(&lhs.rank)
        .then_with(|| lhs.cost.minor().cmp(&rhs.cost.minor()))
        .then_with(|| lhs.name.cmp(&rhs.name))
        .then_with(|| lhs.id.cmp(&rhs.id))
}
