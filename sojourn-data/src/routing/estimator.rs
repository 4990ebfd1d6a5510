//! [`TravelEstimator`] backed by OSRM's Table API.
//!
//! # Example
//!
//! ```no_run
//! use geo::Coord;
//! use sojourn_core::{Location, TravelEstimator};
//! use sojourn_data::routing::OsrmTravelEstimator;
//!
//! let estimator = OsrmTravelEstimator::new("http://localhost:5000")?;
//! let hotel = Location::named("hotel").at(Coord { x: 2.35, y: 48.86 });
//! let louvre = Location::named("Louvre").at(Coord { x: 2.337, y: 48.861 });
//!
//! let leg = estimator.estimate(&hotel, &louvre)?;
//! assert_eq!(leg.to, "Louvre");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use geo::Coord;
use log::debug;
use sojourn_core::{
    Currency, Location, Money, TravelError, TravelEstimator, TravelLeg, TravelMatrix, TravelMode,
    distinct_locations,
};
use url::Url;

use super::osrm::TableResponse;
use crate::http::{BlockingHttp, ClientBuildError, endpoint, parse_base_url};

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "sojourn-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`OsrmTravelEstimator`].
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Currency the zero-cost walking legs are priced in.
    pub currency: Currency,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            currency: Currency::default(),
        }
    }
}

impl OsrmConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
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

    /// Price legs in `currency`.
    #[must_use]
    pub const fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

/// Walking-time estimator using the OSRM Table API.
///
/// A whole matrix is fetched in a single request, so the engine's prefetch
/// costs one round trip however many candidates it considers. Legs are
/// reported as free walking legs; pairs OSRM cannot route are left out of
/// the matrix and surface as [`TravelError::Unreachable`] from
/// [`TravelEstimator::estimate`].
///
/// Every location must carry coordinates.
#[derive(Debug)]
pub struct OsrmTravelEstimator {
    http: BlockingHttp,
    base_url: Url,
    currency: Currency,
}

impl OsrmTravelEstimator {
    /// Create an estimator with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(OsrmConfig::new(base_url))
    }

    /// Create an estimator with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: OsrmConfig) -> Result<Self, ClientBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let http = BlockingHttp::new(&config.user_agent, config.timeout)?;
        Ok(Self {
            http,
            base_url,
            currency: config.currency,
        })
    }

    /// Build the Table API URL: `{base_url}/table/v1/walking/{coordinates}`
    /// where coordinates are semicolon-separated `lon,lat` pairs.
    fn build_table_url(&self, coords: &[Coord<f64>]) -> String {
        let joined = coords
            .iter()
            .map(|coord| format!("{},{}", coord.x, coord.y))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}?annotations=duration,distance",
            endpoint(&self.base_url, &format!("table/v1/walking/{joined}"))
        )
    }

    async fn fetch_matrix_async(
        &self,
        locations: &[&Location],
        coords: &[Coord<f64>],
    ) -> Result<TravelMatrix, TravelError> {
        let url = self.build_table_url(coords);
        debug!("requesting {} x {} OSRM table", coords.len(), coords.len());

        let response = self
            .http
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let table: TableResponse = response
            .json()
            .await
            .map_err(|err| TravelError::ParseError {
                message: err.to_string(),
            })?;

        self.convert_response(locations, table)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TravelError {
        if error.is_timeout() {
            return TravelError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.http.timeout_secs(),
            };
        }

        if let Some(status) = error.status() {
            return TravelError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        TravelError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Turn an OSRM table into legs between the named locations.
    ///
    /// Null, negative, non-finite or overflowing durations mark the pair as
    /// unreachable and the leg is left out.
    fn convert_response(
        &self,
        locations: &[&Location],
        response: TableResponse,
    ) -> Result<TravelMatrix, TravelError> {
        if !response.is_ok() {
            return Err(TravelError::ServiceError {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        let durations = response
            .durations
            .ok_or_else(|| TravelError::ParseError {
                message: "OSRM response missing durations array".to_owned(),
            })?;
        let size = locations.len();
        if durations.len() != size || durations.iter().any(|row| row.len() != size) {
            return Err(TravelError::ParseError {
                message: format!("expected a {size}x{size} durations array"),
            });
        }
        let distances = response.distances.unwrap_or_default();

        let mut matrix = TravelMatrix::new();
        for ((row_index, from), row) in locations.iter().enumerate().zip(&durations) {
            for ((column, to), cell) in locations.iter().enumerate().zip(row) {
                let Some(duration) = cell.and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                else {
                    debug!("OSRM found no route from {:?} to {:?}", from.name, to.name);
                    continue;
                };
                let leg = TravelLeg::new(
                    from.name.clone(),
                    to.name.clone(),
                    TravelMode::Walking,
                    duration,
                )
                .with_cost(Money::zero(self.currency));
                let distance = distances
                    .get(row_index)
                    .and_then(|cells| cells.get(column))
                    .copied()
                    .flatten()
                    .and_then(whole_metres);
                matrix.insert(match distance {
                    Some(metres) => leg.with_distance(metres),
                    None => leg,
                });
            }
        }
        Ok(matrix)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the value is finite, non-negative and within u32 range"
)]
fn whole_metres(raw: f64) -> Option<u32> {
    (raw.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&raw)).then(|| raw.round() as u32)
}

impl TravelEstimator for OsrmTravelEstimator {
    fn estimate(&self, from: &Location, to: &Location) -> Result<TravelLeg, TravelError> {
        let matrix = self.estimate_matrix(&[from.clone(), to.clone()])?;
        matrix
            .leg(&from.name, &to.name)
            .cloned()
            .ok_or_else(|| TravelError::Unreachable {
                from: from.name.clone(),
                to: to.name.clone(),
            })
    }

    /// Fetch legs between every pair of distinct locations in one request.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded. From a `current_thread` runtime the estimator falls
    /// back to its own runtime, which blocks the caller's.
    fn estimate_matrix(&self, locations: &[Location]) -> Result<TravelMatrix, TravelError> {
        let distinct = distinct_locations(locations);
        if distinct.is_empty() {
            return Err(TravelError::EmptyInput);
        }
        let coords = distinct
            .iter()
            .map(|location| {
                location
                    .coord
                    .ok_or_else(|| TravelError::MissingCoordinates {
                        location: location.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.http
            .block_on(self.fetch_matrix_async(&distinct, &coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn located(name: &str, x: f64, y: f64) -> Location {
        Location::named(name).at(Coord { x, y })
    }

    #[fixture]
    fn estimator() -> OsrmTravelEstimator {
        OsrmTravelEstimator::with_config(
            OsrmConfig::new("http://osrm.example.com/").with_currency(Currency::EUR),
        )
        .expect("estimator should build")
    }

    #[fixture]
    fn pair() -> Vec<Location> {
        vec![located("hotel", -0.1, 51.5), located("museum", -0.2, 51.6)]
    }

    fn table(durations: Vec<Vec<Option<f64>>>) -> TableResponse {
        TableResponse {
            code: "Ok".to_owned(),
            message: None,
            durations: Some(durations),
            distances: None,
        }
    }

    #[rstest]
    fn table_url_lists_lon_lat_pairs(estimator: OsrmTravelEstimator, pair: Vec<Location>) {
        let coords: Vec<_> = pair.iter().filter_map(|location| location.coord).collect();
        assert_eq!(
            estimator.build_table_url(&coords),
            "http://osrm.example.com/table/v1/walking/-0.1,51.5;-0.2,51.6?annotations=duration,distance"
        );
    }

    #[rstest]
    fn converts_durations_and_distances(estimator: OsrmTravelEstimator, pair: Vec<Location>) {
        let refs: Vec<&Location> = pair.iter().collect();
        let mut response = table(vec![
            vec![Some(0.0), Some(600.4)],
            vec![Some(590.0), Some(0.0)],
        ]);
        response.distances = Some(vec![vec![Some(0.0), Some(812.6)], vec![None, Some(0.0)]]);

        let matrix = estimator
            .convert_response(&refs, response)
            .expect("should parse");

        let outbound = matrix.leg("hotel", "museum").expect("outbound leg");
        assert_eq!(outbound.duration, Duration::from_secs_f64(600.4));
        assert_eq!(outbound.distance_meters, Some(813));
        assert_eq!(outbound.cost, Money::zero(Currency::EUR));
        assert_eq!(outbound.mode, TravelMode::Walking);
        let inbound = matrix.leg("museum", "hotel").expect("inbound leg");
        assert_eq!(inbound.distance_meters, None);
        assert_eq!(matrix.len(), 4);
    }

    #[rstest]
    fn invalid_durations_are_unreachable(estimator: OsrmTravelEstimator, pair: Vec<Location>) {
        let refs: Vec<&Location> = pair.iter().collect();
        let response = table(vec![
            vec![Some(0.0), Some(-1.0)],
            vec![Some(f64::NAN), Some(f64::INFINITY)],
        ]);

        let matrix = estimator
            .convert_response(&refs, response)
            .expect("should parse");

        assert!(matrix.leg("hotel", "museum").is_none());
        assert!(matrix.leg("museum", "hotel").is_none());
        assert!(matrix.leg("museum", "museum").is_none());
        assert!(matrix.leg("hotel", "hotel").is_some());
    }

    #[rstest]
    fn service_errors_carry_code_and_message(estimator: OsrmTravelEstimator, pair: Vec<Location>) {
        let refs: Vec<&Location> = pair.iter().collect();
        let response = TableResponse {
            code: "InvalidQuery".to_owned(),
            message: Some("Too many coordinates".to_owned()),
            durations: None,
            distances: None,
        };

        let err = estimator
            .convert_response(&refs, response)
            .expect_err("should fail");

        assert_eq!(
            err,
            TravelError::ServiceError {
                code: "InvalidQuery".to_owned(),
                message: "Too many coordinates".to_owned(),
            }
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some(vec![vec![Some(0.0)]]))]
    fn malformed_tables_are_parse_errors(
        estimator: OsrmTravelEstimator,
        pair: Vec<Location>,
        #[case] durations: Option<Vec<Vec<Option<f64>>>>,
    ) {
        let refs: Vec<&Location> = pair.iter().collect();
        let response = TableResponse {
            code: "Ok".to_owned(),
            message: None,
            durations,
            distances: None,
        };

        let err = estimator
            .convert_response(&refs, response)
            .expect_err("should fail");

        assert!(matches!(err, TravelError::ParseError { .. }));
    }

    #[rstest]
    fn empty_input_returns_error(estimator: OsrmTravelEstimator) {
        let err = estimator.estimate_matrix(&[]).expect_err("should fail");
        assert_eq!(err, TravelError::EmptyInput);
    }

    #[rstest]
    fn locations_need_coordinates(estimator: OsrmTravelEstimator) {
        let err = estimator
            .estimate_matrix(&[located("hotel", 0.0, 0.0), Location::named("Atlantis")])
            .expect_err("should fail");
        assert_eq!(
            err,
            TravelError::MissingCoordinates {
                location: "Atlantis".to_owned(),
            }
        );
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = OsrmConfig::new("http://example.com")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent/1.0")
            .with_currency(Currency::EUR);

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.currency, Currency::EUR);
    }
}
