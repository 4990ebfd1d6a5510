//! Travel between locations: legs, prefetched matrices and estimators.
//!
//! The engine never computes routes itself. A [`TravelEstimator`] supplies
//! the duration and cost of moving between two named locations, and the
//! engine prefetches every leg it may need into a [`TravelMatrix`] before
//! any scheduling takes place. A missing matrix cell means the pair is
//! unreachable.

mod error;
mod estimator;
mod leg;
mod matrix;

pub use error::TravelError;
pub use estimator::{TravelEstimator, distinct_locations};
pub use leg::{TravelLeg, TravelMode};
pub use matrix::TravelMatrix;
