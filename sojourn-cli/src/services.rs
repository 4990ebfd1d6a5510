//! Construction of the networked collaborators.

use sojourn_core::{ConditionsSource, TravelEstimator};
use sojourn_data::{ConditionsConfig, HttpConditionsSource, OsrmConfig, OsrmTravelEstimator};

use crate::CliError;

/// Builds the travel estimator and conditions feed for a command.
pub(crate) trait ServiceBuilder {
    type Estimator: TravelEstimator;
    type Conditions: ConditionsSource;

    fn estimator(&self, config: OsrmConfig) -> Result<Self::Estimator, CliError>;

    fn conditions(&self, config: ConditionsConfig) -> Result<Self::Conditions, CliError>;
}

/// OSRM for travel legs, WeatherAPI and NewsAPI for conditions.
pub(crate) struct HttpServices;

impl ServiceBuilder for HttpServices {
    type Estimator = OsrmTravelEstimator;
    type Conditions = HttpConditionsSource;

    fn estimator(&self, config: OsrmConfig) -> Result<Self::Estimator, CliError> {
        OsrmTravelEstimator::with_config(config).map_err(|source| CliError::BuildClient {
            service: "OSRM",
            source,
        })
    }

    fn conditions(&self, config: ConditionsConfig) -> Result<Self::Conditions, CliError> {
        HttpConditionsSource::with_config(config).map_err(|source| CliError::BuildClient {
            service: "conditions",
            source,
        })
    }
}
