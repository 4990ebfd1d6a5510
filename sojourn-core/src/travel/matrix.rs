//! Prefetched legs between named locations.

use std::collections::HashMap;

use crate::Currency;

use super::TravelLeg;

/// Legs between every ordered pair of a set of locations.
///
/// A pair without a leg is unreachable. Lookups are by location name and
/// never touch the network, which keeps scheduling pure.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use sojourn_core::{TravelLeg, TravelMatrix, TravelMode};
///
/// let mut matrix = TravelMatrix::new();
/// matrix.insert(TravelLeg::new("A", "B", TravelMode::Walking, Duration::from_secs(300)));
/// assert!(matrix.leg("A", "B").is_some());
/// assert!(matrix.leg("B", "A").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TravelMatrix {
    legs: HashMap<String, HashMap<String, TravelLeg>>,
}

impl TravelMatrix {
    /// An empty matrix in which every pair is unreachable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `leg`, replacing any previous leg for the same pair.
    pub fn insert(&mut self, leg: TravelLeg) {
        self.legs
            .entry(leg.from.clone())
            .or_default()
            .insert(leg.to.clone(), leg);
    }

    /// The leg from `from` to `to`, if the pair is reachable.
    #[must_use]
    pub fn leg(&self, from: &str, to: &str) -> Option<&TravelLeg> {
        self.legs.get(from)?.get(to)
    }

    /// Whether any leg starts at `location`.
    #[must_use]
    pub fn knows(&self, location: &str) -> bool {
        self.legs.contains_key(location)
    }

    /// Number of reachable pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.legs.values().map(HashMap::len).sum()
    }

    /// Whether no pair is reachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy every leg of `other` into `self`.
    pub fn extend(&mut self, other: Self) {
        for leg in other.legs.into_values().flat_map(HashMap::into_values) {
            self.insert(leg);
        }
    }

    /// The first leg whose cost is not in `currency`.
    #[must_use]
    pub fn foreign_leg(&self, currency: Currency) -> Option<&TravelLeg> {
        self.legs
            .values()
            .flat_map(HashMap::values)
            .find(|leg| leg.cost.currency() != currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Money, TravelMode};
    use rstest::rstest;
    use std::time::Duration;

    fn leg(from: &str, to: &str, minutes: u64) -> TravelLeg {
        TravelLeg::new(from, to, TravelMode::Walking, Duration::from_secs(minutes * 60))
    }

    #[rstest]
    fn later_inserts_replace_earlier_legs() {
        let mut matrix = TravelMatrix::new();
        matrix.insert(leg("A", "B", 5));
        matrix.insert(leg("A", "B", 7));
        assert_eq!(matrix.len(), 1);
        assert_eq!(
            matrix.leg("A", "B").map(|l| l.duration),
            Some(Duration::from_secs(7 * 60))
        );
    }

    #[rstest]
    fn extend_merges_pairs() {
        let mut left = TravelMatrix::new();
        left.insert(leg("A", "B", 5));
        let mut right = TravelMatrix::new();
        right.insert(leg("B", "A", 6));
        left.extend(right);
        assert_eq!(left.len(), 2);
        assert!(left.knows("B"));
    }

    #[rstest]
    fn finds_legs_priced_in_another_currency() {
        let mut matrix = TravelMatrix::new();
        matrix.insert(leg("A", "B", 5).with_cost(Money::from_minor(100, Currency::USD)));
        matrix.insert(leg("B", "A", 5).with_cost(Money::from_minor(100, Currency::EUR)));
        let foreign = matrix.foreign_leg(Currency::USD).expect("euro leg");
        assert_eq!(foreign.from, "B");
    }
}
