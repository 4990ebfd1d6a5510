//! Planner configuration passed to the engine at construction.
//!
//! Every field has a default, so a partial configuration file deserialises
//! cleanly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for building and adjusting itineraries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Meal break policy.
    pub meal_break: MealBreakConfig,
    /// Weights of the rank score.
    pub weights: RankWeights,
}

/// When and how meal breaks are inserted.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use sojourn_planner::MealBreakConfig;
///
/// let config: MealBreakConfig = serde_json::from_str(r#"{"after_minutes": 180}"#)?;
/// assert!(config.enabled);
/// assert_eq!(config.after_visiting, Duration::from_secs(180 * 60));
/// assert_eq!(config.duration, MealBreakConfig::default().duration);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealBreakConfig {
    /// Whether meal breaks are inserted at all.
    pub enabled: bool,
    /// Visiting time after which a break is due.
    #[serde(rename = "after_minutes", with = "minutes")]
    pub after_visiting: Duration,
    /// Length of the break.
    #[serde(rename = "duration_minutes", with = "minutes")]
    pub duration: Duration,
    /// Cost of the meal in minor units of the plan currency.
    pub cost_minor: u64,
}

impl Default for MealBreakConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            after_visiting: Duration::from_secs(4 * 60 * 60),
            duration: Duration::from_secs(45 * 60),
            cost_minor: 1500,
        }
    }
}

impl MealBreakConfig {
    /// A configuration that never inserts meal breaks.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Whether a break is due after `visiting` time without one.
    #[must_use]
    pub fn is_due(&self, visiting: Duration) -> bool {
        self.enabled && !self.duration.is_zero() && visiting >= self.after_visiting
    }
}

/// Weights combined into an attraction's rank score.
///
/// The score is
/// `interest × profile weight + popularity × catalogue popularity`, plus
/// `liked` for liked attractions or categories, minus `disliked` for
/// disliked categories, `weather_demotion` for demoted attractions and
/// `repeat_visit` for attractions already visited in the city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankWeights {
    /// Multiplier for the traveller's interest in the category.
    pub interest: f32,
    /// Interest assumed for categories absent from the profile.
    pub unmatched_interest: f32,
    /// Multiplier for catalogue popularity.
    pub popularity: f32,
    /// Bonus for liked categories or attractions.
    pub liked: f32,
    /// Penalty for disliked categories.
    pub disliked: f32,
    /// Penalty for attractions demoted by weather or news.
    pub weather_demotion: f32,
    /// Penalty for attractions already visited in the city.
    pub repeat_visit: f32,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            interest: 1.0,
            unmatched_interest: 0.0,
            popularity: 0.25,
            liked: 0.2,
            disliked: 0.3,
            weather_demotion: 0.5,
            repeat_visit: 2.0,
        }
    }
}

mod minutes {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    const SECONDS_PER_MINUTE: u64 = 60;

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs().div_ceil(SECONDS_PER_MINUTE))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        let minutes = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(minutes.saturating_mul(SECONDS_PER_MINUTE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_secs(3 * 60 * 60), false)]
    #[case(Duration::from_secs(4 * 60 * 60), true)]
    fn meal_break_is_due_at_the_threshold(#[case] visiting: Duration, #[case] due: bool) {
        assert_eq!(MealBreakConfig::default().is_due(visiting), due);
    }

    #[rstest]
    fn disabled_meal_breaks_are_never_due() {
        let config = MealBreakConfig::disabled();
        assert!(!config.is_due(Duration::from_secs(24 * 60 * 60)));
    }

    #[rstest]
    fn partial_configuration_keeps_defaults() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"weights": {"repeat_visit": 5.0}}"#).expect("config");
        assert_eq!(config.meal_break, MealBreakConfig::default());
        assert_eq!(config.weights.interest, RankWeights::default().interest);
        assert_eq!(config.weights.repeat_visit, 5.0);
    }
}
