use thiserror::Error;

/// Errors from [`crate::travel::TravelEstimator`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TravelError {
    /// No locations were provided.
    ///
    /// Matrix requests need at least one location. Callers should pre-filter
    /// input to avoid this condition.
    #[error("at least one location is required")]
    EmptyInput,

    /// A location has no coordinates and the estimator needs them.
    #[error("location {location:?} has no coordinates")]
    MissingCoordinates {
        /// Name of the location.
        location: String,
    },

    /// No route exists between the two locations.
    #[error("no route from {from:?} to {to:?}")]
    Unreachable {
        /// Origin name.
        from: String,
        /// Destination name.
        to: String,
    },

    /// A network error occurred while contacting the routing service.
    ///
    /// This includes connection failures and DNS resolution errors.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// The URL that was being requested.
        url: String,
        /// Description of the network error.
        message: String,
    },

    /// The request to the routing service timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// The URL that was being requested.
        url: String,
        /// The timeout duration in seconds.
        timeout_secs: u64,
    },

    /// The routing service returned an HTTP error status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// The URL that was being requested.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error message or response body excerpt.
        message: String,
    },

    /// The routing service returned an error response.
    ///
    /// OSRM reports failures with a code such as `"InvalidQuery"` or
    /// `"NoTable"`.
    #[error("routing service error ({code}): {message}")]
    ServiceError {
        /// Error code from the routing service.
        code: String,
        /// Error message from the routing service.
        message: String,
    },

    /// Failed to parse the response from the routing service.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },
}
