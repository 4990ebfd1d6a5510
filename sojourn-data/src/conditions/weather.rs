//! WeatherAPI forecast decoding and day assessment.
//!
//! A forecast turns into two things: practical advice for the traveller and
//! an outlook for outdoor attractions. Likely rain demotes outdoor visits;
//! near-certain rain or a storm rules them out.

use chrono::NaiveDate;
use serde::Deserialize;
use sojourn_core::{Attraction, Penalties};

/// Above this maximum temperature (°C) travellers should expect heat.
pub const HOT_DAY_C: f64 = 30.0;
/// Below this maximum temperature (°C) travellers should wrap up.
pub const COLD_DAY_C: f64 = 10.0;
/// Rain chance (%) above which outdoor visits are demoted.
pub const RAIN_LIKELY_PCT: f64 = 50.0;
/// Rain chance (%) from which outdoor visits are ruled out.
pub const RAIN_CERTAIN_PCT: f64 = 90.0;
/// UV index above which sun protection is advised.
pub const HIGH_UV: f64 = 7.0;
/// Daily temperature swing (°C) above which layers are advised.
pub const WIDE_SWING_C: f64 = 10.0;

const STORM_WORDS: [&str; 3] = ["thunder", "storm", "blizzard"];

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    forecast: ForecastBlock,
}

#[derive(Debug, Deserialize)]
struct ForecastBlock {
    #[serde(rename = "forecastday", default)]
    days: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: NaiveDate,
    day: DayForecast,
}

impl ForecastResponse {
    /// The summary for `date`, falling back to the last forecast day.
    pub(crate) fn into_day(self, date: NaiveDate) -> Option<DayForecast> {
        let mut days = self.forecast.days;
        match days.iter().position(|day| day.date == date) {
            Some(index) => Some(days.swap_remove(index).day),
            None => days.pop().map(|day| day.day),
        }
    }
}

/// Daily summary from a WeatherAPI forecast.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DayForecast {
    /// Maximum temperature in °C.
    #[serde(rename = "maxtemp_c")]
    pub max_temp_c: f64,
    /// Minimum temperature in °C.
    #[serde(rename = "mintemp_c")]
    pub min_temp_c: f64,
    /// Average temperature in °C.
    #[serde(rename = "avgtemp_c", default)]
    pub avg_temp_c: f64,
    /// Chance of rain in percent.
    #[serde(rename = "daily_chance_of_rain", default)]
    pub rain_chance: f64,
    /// Average humidity in percent.
    #[serde(rename = "avghumidity", default)]
    pub humidity: f64,
    /// UV index.
    #[serde(default)]
    pub uv: f64,
    /// Short description of the conditions.
    pub condition: Condition,
}

/// Textual weather condition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Condition {
    /// Description such as `"Patchy rain possible"`.
    pub text: String,
}

/// How the weather bears on outdoor attractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutdoorOutlook {
    /// Nothing to worry about.
    Fine,
    /// Outdoor visits are doubtful and should rank lower.
    Doubtful,
    /// Outdoor visits should not be scheduled.
    Closed,
}

/// Advice and outlook derived from a [`DayForecast`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherAssessment {
    /// Practical advice lines.
    pub advice: Vec<String>,
    /// Outlook for outdoor attractions.
    pub outdoor: OutdoorOutlook,
}

impl DayForecast {
    /// Assess the day.
    ///
    /// # Examples
    /// ```
    /// use sojourn_data::conditions::{Condition, DayForecast, OutdoorOutlook};
    ///
    /// let forecast = DayForecast {
    ///     max_temp_c: 33.0,
    ///     min_temp_c: 21.0,
    ///     avg_temp_c: 27.0,
    ///     rain_chance: 10.0,
    ///     humidity: 40.0,
    ///     uv: 8.0,
    ///     condition: Condition { text: "Sunny".to_owned() },
    /// };
    /// let assessment = forecast.assess();
    /// assert_eq!(assessment.outdoor, OutdoorOutlook::Fine);
    /// assert_eq!(assessment.advice.len(), 3);
    /// ```
    #[must_use]
    pub fn assess(&self) -> WeatherAssessment {
        WeatherAssessment {
            advice: self.advice(),
            outdoor: self.outdoor_outlook(),
        }
    }

    fn advice(&self) -> Vec<String> {
        let mut advice = Vec::new();
        if self.max_temp_c > HOT_DAY_C {
            advice.push("Bring sunscreen and stay hydrated");
        } else if self.max_temp_c < COLD_DAY_C {
            advice.push("Bring warm clothing");
        }
        if self.rain_chance > RAIN_LIKELY_PCT {
            advice.push("Bring an umbrella");
            advice.push("Consider indoor backup activities");
        }
        if self.uv > HIGH_UV {
            advice.push("Wear sun protection and seek shade during peak hours");
        }
        if self.temperature_swing() > WIDE_SWING_C {
            advice.push("Dress in layers for temperature changes throughout the day");
        }
        advice.into_iter().map(str::to_owned).collect()
    }

    fn outdoor_outlook(&self) -> OutdoorOutlook {
        if self.rain_chance >= RAIN_CERTAIN_PCT || self.is_stormy() {
            OutdoorOutlook::Closed
        } else if self.rain_chance > RAIN_LIKELY_PCT {
            OutdoorOutlook::Doubtful
        } else {
            OutdoorOutlook::Fine
        }
    }

    fn is_stormy(&self) -> bool {
        let text = self.condition.text.to_lowercase();
        STORM_WORDS.iter().any(|word| text.contains(word))
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "temperature swing is a difference of two readings"
    )]
    fn temperature_swing(&self) -> f64 {
        (self.max_temp_c - self.min_temp_c).abs()
    }
}

impl WeatherAssessment {
    /// Penalties for the outdoor attractions among `candidates`.
    #[must_use]
    pub fn penalties(&self, candidates: &[Attraction]) -> Penalties {
        let outdoor = candidates
            .iter()
            .filter(|attraction| attraction.category.is_outdoor())
            .map(|attraction| attraction.id.clone());
        let mut penalties = Penalties {
            advice: self.advice.clone(),
            ..Penalties::none()
        };
        match self.outdoor {
            OutdoorOutlook::Fine => {}
            OutdoorOutlook::Doubtful => penalties.demoted.extend(outdoor),
            OutdoorOutlook::Closed => penalties.unavailable.extend(outdoor),
        }
        penalties
    }
}
