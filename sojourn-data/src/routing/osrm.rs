//! OSRM Table service response types.
//!
//! The Table service computes the fastest route between all pairs of
//! supplied coordinates. Requests ask for both the `duration` and the
//! `distance` annotations.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#table-service>

use serde::Deserialize;

/// OSRM Table API response.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"InvalidQuery"` - Invalid query parameters
    /// - `"InvalidOptions"` - Invalid option combination
    /// - `"NoTable"` - Table computation failed
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Matrix of durations in seconds.
    ///
    /// `durations[i][j]` is the travel time from the i-th to the j-th
    /// coordinate. Values are `None` when no route exists between a pair.
    pub durations: Option<Vec<Vec<Option<f64>>>>,

    /// Matrix of distances in metres, laid out like `durations`.
    #[serde(default)]
    pub distances: Option<Vec<Vec<Option<f64>>>>,
}

impl TableResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "code": "Ok",
            "durations": [[0.0, 120.5], [118.0, 0.0]],
            "distances": [[0.0, 410.2], [398.7, 0.0]]
        }"#;

        let response: TableResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        assert!(response.message.is_none());
        let durations = response.durations.expect("should have durations");
        assert_eq!(durations.len(), 2);
        assert_eq!(durations.first().and_then(|row| row.get(1)), Some(&Some(120.5)));
        let distances = response.distances.expect("should have distances");
        assert_eq!(distances.get(1).and_then(|row| row.first()), Some(&Some(398.7)));
    }

    #[test]
    fn deserialise_error_response() {
        let json = r#"{
            "code": "InvalidQuery",
            "message": "Coordinates are invalid"
        }"#;

        let response: TableResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(!response.is_ok());
        assert_eq!(response.message.as_deref(), Some("Coordinates are invalid"));
        assert!(response.durations.is_none());
        assert!(response.distances.is_none());
    }
}
