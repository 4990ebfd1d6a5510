//! Weather and local-news conditions for a day.
//!
//! [`HttpConditionsSource`] implements [`sojourn_core::ConditionsSource`] over
//! WeatherAPI and NewsAPI. Either feed is optional: without an API key it is
//! skipped and contributes no penalties.
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use sojourn_core::ConditionsSource;
//! use sojourn_data::conditions::{ConditionsConfig, HttpConditionsSource};
//!
//! let config = ConditionsConfig::default()
//!     .with_weather_key("weather-key")
//!     .with_news_key("news-key");
//! let source = HttpConditionsSource::with_config(config)?;
//! let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default();
//! let penalties = source.penalties_for("Paris", date, &[])?;
//! for line in &penalties.advice {
//!     eprintln!("{line}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod news;
mod weather;

use std::time::Duration;

use chrono::{Days, NaiveDate};
use log::{debug, info};
use sojourn_core::{Attraction, ConditionsSource, Penalties, SourceError};
use url::Url;

use crate::http::{BlockingHttp, ClientBuildError, endpoint, parse_base_url};

pub use news::{Article, ArticleSource, Impact, news_penalties};
pub use weather::{
    COLD_DAY_C, Condition, DayForecast, HIGH_UV, HOT_DAY_C, OutdoorOutlook, RAIN_CERTAIN_PCT,
    RAIN_LIKELY_PCT, WIDE_SWING_C, WeatherAssessment,
};

use news::NewsResponse;
use weather::ForecastResponse;

/// Default WeatherAPI endpoint.
pub const DEFAULT_WEATHER_URL: &str = "https://api.weatherapi.com/v1";

/// Default NewsAPI endpoint.
pub const DEFAULT_NEWS_URL: &str = "https://newsapi.org/v2";

/// Default user agent for conditions requests.
pub const DEFAULT_USER_AGENT: &str = "sojourn-conditions/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How far before the plan date news is searched.
const NEWS_LOOKBACK_DAYS: u64 = 7;

/// Configuration for [`HttpConditionsSource`].
#[derive(Clone)]
pub struct ConditionsConfig {
    /// WeatherAPI base URL.
    pub weather_base_url: String,
    /// WeatherAPI key; the weather feed is skipped without one.
    pub weather_api_key: Option<String>,
    /// NewsAPI base URL.
    pub news_base_url: String,
    /// NewsAPI key; the news feed is skipped without one.
    pub news_api_key: Option<String>,
    /// Request timeout applied to both feeds.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for ConditionsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionsConfig")
            .field("weather_base_url", &self.weather_base_url)
            .field("weather_api_key", &self.weather_api_key.as_ref().map(|_| "<redacted>"))
            .field("news_base_url", &self.news_base_url)
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for ConditionsConfig {
    fn default() -> Self {
        Self {
            weather_base_url: DEFAULT_WEATHER_URL.to_owned(),
            weather_api_key: None,
            news_base_url: DEFAULT_NEWS_URL.to_owned(),
            news_api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ConditionsConfig {
    /// Enable the weather feed with `key`.
    #[must_use]
    pub fn with_weather_key(mut self, key: impl Into<String>) -> Self {
        self.weather_api_key = Some(key.into());
        self
    }

    /// Enable the news feed with `key`.
    #[must_use]
    pub fn with_news_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    /// Point the weather feed at `base_url`.
    #[must_use]
    pub fn with_weather_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.weather_base_url = base_url.into();
        self
    }

    /// Point the news feed at `base_url`.
    #[must_use]
    pub fn with_news_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.news_base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

struct Feed {
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Feed {
    fn configured(base_url: &str, api_key: Option<&str>) -> Result<Option<Self>, ClientBuildError> {
        let Some(key) = api_key.filter(|key| !key.trim().is_empty()) else {
            return Ok(None);
        };
        Ok(Some(Self {
            base_url: parse_base_url(base_url)?,
            api_key: key.to_owned(),
        }))
    }
}

/// Conditions feed backed by WeatherAPI and NewsAPI.
///
/// Weather penalties cover outdoor attractions; news penalties cover
/// attractions named in relevant articles. Both sets of advice are passed
/// on. Any failure of an enabled feed fails the whole call.
#[derive(Debug)]
pub struct HttpConditionsSource {
    http: BlockingHttp,
    weather: Option<Feed>,
    news: Option<Feed>,
}

impl HttpConditionsSource {
    /// Create a source from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a base URL of an enabled feed is invalid or the
    /// HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: ConditionsConfig) -> Result<Self, ClientBuildError> {
        let weather = Feed::configured(
            &config.weather_base_url,
            config.weather_api_key.as_deref(),
        )?;
        let news = Feed::configured(&config.news_base_url, config.news_api_key.as_deref())?;
        let http = BlockingHttp::new(&config.user_agent, config.timeout)?;
        Ok(Self {
            http,
            weather,
            news,
        })
    }

    /// Whether any feed is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.weather.is_some() || self.news.is_some()
    }

    async fn fetch_forecast(
        &self,
        feed: &Feed,
        city: &str,
        date: NaiveDate,
    ) -> Result<DayForecast, SourceError> {
        let url = endpoint(&feed.base_url, "forecast.json");
        let day = date.to_string();
        let response = self
            .http
            .client()
            .get(&url)
            .query(&[
                ("key", feed.api_key.as_str()),
                ("q", city),
                ("dt", day.as_str()),
                ("days", "1"),
                ("aqi", "no"),
            ])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err))?;

        let body: ForecastResponse = response.json().await.map_err(|err| {
            SourceError::Malformed {
                message: err.to_string(),
            }
        })?;
        body.into_day(date).ok_or_else(|| SourceError::Malformed {
            message: format!("forecast for {city} lists no days"),
        })
    }

    async fn fetch_news(
        &self,
        feed: &Feed,
        city: &str,
        date: NaiveDate,
    ) -> Result<Vec<Article>, SourceError> {
        let url = endpoint(&feed.base_url, "everything");
        let query = format!("{city} (event OR festival OR closure OR construction)");
        let from = date
            .checked_sub_days(Days::new(NEWS_LOOKBACK_DAYS))
            .unwrap_or(date)
            .to_string();
        let to = date.to_string();
        let response = self
            .http
            .client()
            .get(&url)
            .query(&[
                ("apiKey", feed.api_key.as_str()),
                ("q", query.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("language", "en"),
                ("sortBy", "relevancy"),
            ])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err))?;

        let body: NewsResponse = response.json().await.map_err(|err| {
            SourceError::Malformed {
                message: err.to_string(),
            }
        })?;
        if body.status != "ok" {
            let code = body.code.unwrap_or(body.status);
            return Err(SourceError::Unavailable {
                message: format!(
                    "news feed answered {code}: {}",
                    body.message.unwrap_or_default()
                ),
            });
        }
        Ok(body.articles)
    }

    fn convert_reqwest_error(&self, error: reqwest::Error) -> SourceError {
        if error.is_timeout() {
            return SourceError::Timeout {
                timeout_secs: self.http.timeout_secs(),
            };
        }
        let status = error.status();
        let decode = error.is_decode();
        // The URL carries the API key in its query string.
        let message = error.without_url().to_string();
        match status {
            Some(status) => SourceError::Http {
                status: status.as_u16(),
                message,
            },
            None if decode => SourceError::Malformed { message },
            None => SourceError::Unavailable { message },
        }
    }
}

impl ConditionsSource for HttpConditionsSource {
    fn penalties_for(
        &self,
        city: &str,
        date: NaiveDate,
        candidates: &[Attraction],
    ) -> Result<Penalties, SourceError> {
        let mut penalties = Penalties::none();
        if let Some(feed) = &self.weather {
            let forecast = self
                .http
                .block_on(self.fetch_forecast(feed, city, date))?;
            let assessment = forecast.assess();
            info!(
                "weather in {city} on {date}: {} ({:?} for outdoor visits)",
                forecast.condition.text, assessment.outdoor
            );
            penalties = penalties.merge(assessment.penalties(candidates));
        }
        if let Some(feed) = &self.news {
            let articles = self.http.block_on(self.fetch_news(feed, city, date))?;
            debug!("{} news articles for {city}", articles.len());
            penalties = penalties.merge(news_penalties(&articles, candidates));
        }
        Ok(penalties)
    }
}
