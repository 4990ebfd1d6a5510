//! Attraction categories and per-category interest weights.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad category of an attraction.
///
/// # Examples
/// ```
/// use sojourn_core::Category;
///
/// assert_eq!(Category::History.as_str(), "history");
/// assert!(Category::Nature.is_outdoor());
/// assert!(!Category::Art.is_outdoor());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Historical sites and museums.
    History,
    /// Galleries and artistic venues.
    Art,
    /// Parks, gardens and landscapes.
    Nature,
    /// Food halls, markets and tastings.
    Food,
    /// Architectural landmarks.
    Architecture,
    /// Shopping districts.
    Shopping,
    /// Shows and entertainment venues.
    Entertainment,
    /// Cultural centres and events.
    Culture,
}

/// Error returned when a category name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category {name:?}")]
pub struct UnknownCategory {
    /// Rejected name.
    pub name: String,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Self; 8] = [
        Self::History,
        Self::Art,
        Self::Nature,
        Self::Food,
        Self::Architecture,
        Self::Shopping,
        Self::Entertainment,
        Self::Culture,
    ];

    /// Lowercase name of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Art => "art",
            Self::Nature => "nature",
            Self::Food => "food",
            Self::Architecture => "architecture",
            Self::Shopping => "shopping",
            Self::Entertainment => "entertainment",
            Self::Culture => "culture",
        }
    }

    /// Whether visits in this category happen mostly outdoors and are
    /// therefore exposed to the weather.
    #[must_use]
    pub const fn is_outdoor(&self) -> bool {
        matches!(self, Self::Nature | Self::Architecture)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == lowered)
            .ok_or_else(|| UnknownCategory { name: s.to_owned() })
    }
}

/// A traveller's interest in each category, weighted in `0.0..=1.0`.
///
/// # Examples
/// ```
/// use sojourn_core::{Category, InterestProfile};
///
/// let profile = InterestProfile::new()
///     .with_weight(Category::Art, 0.8)
///     .with_weight(Category::Food, 1.7);
/// assert_eq!(profile.weight(Category::Art), Some(0.8));
/// assert_eq!(profile.weight(Category::Food), Some(1.0));
/// assert!(profile.weight(Category::Shopping).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    from = "HashMap<Category, f32>",
    into = "HashMap<Category, f32>"
)]
pub struct InterestProfile {
    weights: HashMap<Category, f32>,
}

impl From<HashMap<Category, f32>> for InterestProfile {
    fn from(weights: HashMap<Category, f32>) -> Self {
        weights
            .into_iter()
            .fold(Self::new(), |profile, (category, weight)| {
                profile.with_weight(category, weight)
            })
    }
}

impl From<InterestProfile> for HashMap<Category, f32> {
    fn from(profile: InterestProfile) -> Self {
        profile.weights
    }
}

impl InterestProfile {
    /// Construct an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight for `category`, if the traveller expressed one.
    #[must_use]
    pub fn weight(&self, category: Category) -> Option<f32> {
        self.weights.get(&category).copied()
    }

    /// Insert or update a weight, clamping it into `0.0..=1.0`.
    ///
    /// `NaN` is stored as `0.0`.
    pub fn set_weight(&mut self, category: Category, weight: f32) {
        let clamped = if weight.is_nan() {
            0.0
        } else {
            weight.clamp(0.0, 1.0)
        };
        self.weights.insert(category, clamped);
    }

    /// Chaining form of [`InterestProfile::set_weight`].
    #[must_use]
    pub fn with_weight(mut self, category: Category, weight: f32) -> Self {
        self.set_weight(category, weight);
        self
    }

    /// Categories with a positive weight, in category order.
    #[must_use]
    pub fn preferred(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self
            .weights
            .iter()
            .filter(|(_, weight)| **weight > 0.0)
            .map(|(category, _)| *category)
            .collect();
        categories.sort_unstable();
        categories
    }

    /// Whether no weights have been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("history", Category::History)]
    #[case("Art", Category::Art)]
    #[case(" NATURE ", Category::Nature)]
    fn parses_names_case_insensitively(#[case] input: &str, #[case] expected: Category) {
        assert_eq!(input.parse::<Category>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_names() {
        let err = "opera".parse::<Category>().expect_err("unknown");
        assert_eq!(err.name, "opera");
    }

    #[rstest]
    #[case(-0.5, 0.0)]
    #[case(0.25, 0.25)]
    #[case(3.0, 1.0)]
    #[case(f32::NAN, 0.0)]
    fn clamps_weights(#[case] input: f32, #[case] stored: f32) {
        let profile = InterestProfile::new().with_weight(Category::Culture, input);
        assert_eq!(profile.weight(Category::Culture), Some(stored));
    }

    #[rstest]
    fn preferred_skips_zero_weights() {
        let profile = InterestProfile::new()
            .with_weight(Category::Food, 0.0)
            .with_weight(Category::Art, 0.4)
            .with_weight(Category::History, 0.9);
        assert_eq!(profile.preferred(), vec![Category::History, Category::Art]);
    }

    #[rstest]
    fn deserialising_clamps_weights() {
        let profile: InterestProfile =
            serde_json::from_str(r#"{"art": 0.5, "food": 4.0}"#).expect("profile");
        assert_eq!(profile.weight(Category::Art), Some(0.5));
        assert_eq!(profile.weight(Category::Food), Some(1.0));
    }
}
