//! Travel estimator trait.

use std::collections::HashSet;
use std::sync::Arc;

use crate::Location;

use super::{TravelError, TravelLeg, TravelMatrix};

/// Estimate travel between locations.
///
/// Implementations are shared across worker threads, so they must be
/// `Send + Sync`. Unreachable pairs are reported as
/// [`TravelError::Unreachable`]; every other error aborts the request.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use sojourn_core::{Location, TravelError, TravelEstimator, TravelLeg, TravelMode};
///
/// struct FiveMinutes;
///
/// impl TravelEstimator for FiveMinutes {
///     fn estimate(&self, from: &Location, to: &Location) -> Result<TravelLeg, TravelError> {
///         let minutes = if from.name == to.name { 0 } else { 5 };
///         Ok(TravelLeg::new(
///             from.name.clone(),
///             to.name.clone(),
///             TravelMode::Walking,
///             Duration::from_secs(minutes * 60),
///         ))
///     }
/// }
///
/// let matrix = FiveMinutes.estimate_matrix(&[Location::named("A"), Location::named("B")])?;
/// assert_eq!(matrix.len(), 4);
/// # Ok::<(), TravelError>(())
/// ```
pub trait TravelEstimator: Send + Sync {
    /// Estimate the single leg from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`TravelError::Unreachable`] when no route exists and other
    /// [`TravelError`] variants when the estimate cannot be obtained.
    fn estimate(&self, from: &Location, to: &Location) -> Result<TravelLeg, TravelError>;

    /// Estimate every ordered pair of `locations`, including each location
    /// to itself.
    ///
    /// Locations are deduplicated by name. The default implementation calls
    /// [`TravelEstimator::estimate`] for each pair and leaves unreachable
    /// pairs out of the matrix.
    ///
    /// # Errors
    ///
    /// Returns [`TravelError::EmptyInput`] for an empty slice and propagates
    /// any error other than [`TravelError::Unreachable`].
    fn estimate_matrix(&self, locations: &[Location]) -> Result<TravelMatrix, TravelError> {
        let distinct = distinct_locations(locations);
        if distinct.is_empty() {
            return Err(TravelError::EmptyInput);
        }
        let mut matrix = TravelMatrix::new();
        for from in &distinct {
            for to in &distinct {
                match self.estimate(from, to) {
                    Ok(leg) => matrix.insert(leg),
                    Err(TravelError::Unreachable { .. }) => {
                        log::debug!("no route from {:?} to {:?}", from.name, to.name);
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(matrix)
    }
}

/// First occurrence of each location name, in input order.
#[must_use]
pub fn distinct_locations(locations: &[Location]) -> Vec<&Location> {
    let mut seen = HashSet::new();
    locations
        .iter()
        .filter(|location| seen.insert(location.name.as_str()))
        .collect()
}

impl<T: TravelEstimator + ?Sized> TravelEstimator for Box<T> {
    fn estimate(&self, from: &Location, to: &Location) -> Result<TravelLeg, TravelError> {
        (**self).estimate(from, to)
    }

    fn estimate_matrix(&self, locations: &[Location]) -> Result<TravelMatrix, TravelError> {
        (**self).estimate_matrix(locations)
    }
}

impl<T: TravelEstimator + ?Sized> TravelEstimator for Arc<T> {
    fn estimate(&self, from: &Location, to: &Location) -> Result<TravelLeg, TravelError> {
        (**self).estimate(from, to)
    }

    fn estimate_matrix(&self, locations: &[Location]) -> Result<TravelMatrix, TravelError> {
        (**self).estimate_matrix(locations)
    }
}

impl<T: TravelEstimator + ?Sized> TravelEstimator for &T {
    fn estimate(&self, from: &Location, to: &Location) -> Result<TravelLeg, TravelError> {
        (**self).estimate(from, to)
    }

    fn estimate_matrix(&self, locations: &[Location]) -> Result<TravelMatrix, TravelError> {
        (**self).estimate_matrix(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FlatTravelEstimator;
    use rstest::rstest;
    use std::time::Duration;

    struct Island;

    impl TravelEstimator for Island {
        fn estimate(&self, from: &Location, to: &Location) -> Result<TravelLeg, TravelError> {
            if from.name == to.name {
                return Ok(TravelLeg::new(
                    from.name.clone(),
                    to.name.clone(),
                    crate::TravelMode::Walking,
                    Duration::ZERO,
                ));
            }
            if to.name == "Island" || from.name == "Island" {
                return Err(TravelError::Unreachable {
                    from: from.name.clone(),
                    to: to.name.clone(),
                });
            }
            Ok(TravelLeg::new(
                from.name.clone(),
                to.name.clone(),
                crate::TravelMode::Walking,
                Duration::from_secs(60),
            ))
        }
    }

    #[rstest]
    fn default_matrix_includes_diagonal_and_dedups() {
        let estimator = FlatTravelEstimator::default();
        let locations = [
            Location::named("A"),
            Location::named("B"),
            Location::named("A"),
        ];
        let matrix = estimator.estimate_matrix(&locations).expect("matrix");
        assert_eq!(matrix.len(), 4);
        assert_eq!(
            matrix.leg("A", "A").map(|leg| leg.duration),
            Some(Duration::ZERO)
        );
    }

    #[rstest]
    fn unreachable_pairs_are_left_out() {
        let locations = [Location::named("A"), Location::named("Island")];
        let matrix = Island.estimate_matrix(&locations).expect("matrix");
        assert!(matrix.leg("A", "Island").is_none());
        assert!(matrix.leg("Island", "Island").is_some());
    }

    #[rstest]
    fn errors_on_empty_input() {
        let err = FlatTravelEstimator::default()
            .estimate_matrix(&[])
            .expect_err("expected EmptyInput for empty slice");
        assert_eq!(err, TravelError::EmptyInput);
    }
}
