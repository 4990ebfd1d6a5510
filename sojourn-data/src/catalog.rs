//! Attraction catalogue read from a JSON file.
//!
//! The file maps city names to attraction records:
//!
//! ```json
//! {
//!   "Paris": [
//!     {
//!       "id": "louvre",
//!       "name": "Louvre",
//!       "category": "art",
//!       "location": {"name": "Louvre", "coord": {"x": 2.3376, "y": 48.8606}},
//!       "visit_minutes": 120,
//!       "cost": {"amount": "22", "currency": "EUR"},
//!       "opening_hours": [{"start": "09:00", "end": "18:00"}],
//!       "popularity": 0.95
//!     }
//!   ]
//! }
//! ```
//!
//! City names match case-insensitively. Every record is validated when the
//! catalogue is loaded.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use sojourn_core::{Attraction, AttractionError, CandidateSource, InterestProfile, SourceError};
use thiserror::Error;

/// Errors raised while loading a [`JsonCatalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("failed to read catalogue {path}")]
    Read {
        /// Catalogue path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a city-to-attractions map.
    #[error("failed to decode catalogue {path}")]
    Decode {
        /// Catalogue path.
        path: Utf8PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// A record failed validation.
    #[error("invalid attraction {id:?} in {city}")]
    InvalidRecord {
        /// City the record is listed under.
        city: String,
        /// Identifier of the rejected record.
        id: String,
        /// Validation failure.
        #[source]
        source: AttractionError,
    },
}

/// In-memory catalogue loaded from JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    cities: BTreeMap<String, Vec<Attraction>>,
}

impl JsonCatalog {
    /// Load the catalogue at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the file cannot be read or decoded or a
    /// record is invalid.
    pub fn open(path: &Utf8Path) -> Result<Self, CatalogError> {
        let raw = sojourn_fs::read_utf8(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cities: BTreeMap<String, Vec<Attraction>> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_cities(cities)?;
        info!(
            "loaded {} attractions in {} cities from {path}",
            catalog.len(),
            catalog.cities.len()
        );
        Ok(catalog)
    }

    /// Build a catalogue from already-decoded records.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidRecord`] for the first invalid record.
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeMap;
    /// use std::time::Duration;
    /// use sojourn_core::{Attraction, CandidateSource, Category, Currency, InterestProfile, Location, Money};
    /// use sojourn_data::catalog::JsonCatalog;
    ///
    /// let park = Attraction::new(
    ///     "park",
    ///     "City Park",
    ///     Category::Nature,
    ///     Location::named("City Park"),
    ///     Duration::from_secs(3600),
    ///     Money::zero(Currency::USD),
    /// )?;
    /// let catalog = JsonCatalog::from_cities(BTreeMap::from([("Springfield".to_owned(), vec![park])]))?;
    /// let found = catalog.attractions_for("springfield", &InterestProfile::new())?;
    /// assert_eq!(found.len(), 1);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_cities(cities: BTreeMap<String, Vec<Attraction>>) -> Result<Self, CatalogError> {
        for (city, attractions) in &cities {
            for attraction in attractions {
                attraction
                    .validate()
                    .map_err(|source| CatalogError::InvalidRecord {
                        city: city.clone(),
                        id: attraction.id.to_string(),
                        source,
                    })?;
            }
        }
        let normalised = cities
            .into_iter()
            .map(|(city, attractions)| (city_key(&city), attractions))
            .collect();
        Ok(Self { cities: normalised })
    }

    /// Total number of attractions across all cities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.values().map(Vec::len).sum()
    }

    /// Whether the catalogue lists nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.values().all(Vec::is_empty)
    }
}

fn city_key(city: &str) -> String {
    city.trim().to_lowercase()
}

impl CandidateSource for JsonCatalog {
    /// Every attraction listed for `city`; ranking by interest is left to the
    /// candidate pool.
    fn attractions_for(
        &self,
        city: &str,
        _interests: &InterestProfile,
    ) -> Result<Vec<Attraction>, SourceError> {
        let Some(attractions) = self.cities.get(&city_key(city)) else {
            warn!("catalogue lists no attractions for {city:?}");
            return Ok(Vec::new());
        };
        Ok(attractions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    const CATALOGUE: &str = r#"{
        "Springfield": [
            {
                "id": "museum",
                "name": "Springfield Museum",
                "category": "history",
                "location": {"name": "Springfield Museum"},
                "visit_minutes": 90,
                "cost": {"amount": "12.50", "currency": "USD"},
                "opening_hours": [{"start": "09:00", "end": "17:00"}]
            },
            {
                "id": "gorge",
                "name": "Springfield Gorge",
                "category": "nature",
                "location": {"name": "Springfield Gorge"},
                "visit_minutes": 60,
                "cost": {"amount": "0", "currency": "USD"},
                "popularity": 0.4
            }
        ],
        "Shelbyville": []
    }"#;

    #[fixture]
    fn dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn write(dir: &TempDir, contents: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("catalogue.json"))
            .expect("utf-8 temp path");
        sojourn_fs::write_utf8(&path, contents).expect("write catalogue");
        path
    }

    #[rstest]
    fn loads_cities_case_insensitively(dir: TempDir) {
        let catalog = JsonCatalog::open(&write(&dir, CATALOGUE)).expect("catalogue loads");
        assert_eq!(catalog.len(), 2);

        let found = catalog
            .attractions_for(" SPRINGFIELD ", &InterestProfile::new())
            .expect("lookup");
        let ids: Vec<_> = found.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["museum", "gorge"]);
    }

    #[rstest]
    #[case("Shelbyville")]
    #[case("Capital City")]
    fn unknown_or_empty_cities_have_no_attractions(dir: TempDir, #[case] city: &str) {
        let catalog = JsonCatalog::open(&write(&dir, CATALOGUE)).expect("catalogue loads");
        let found = catalog
            .attractions_for(city, &InterestProfile::new())
            .expect("lookup");
        assert!(found.is_empty());
    }

    #[rstest]
    fn missing_files_fail_to_read(dir: TempDir) {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("absent.json")).expect("utf-8");
        let err = JsonCatalog::open(&path).expect_err("missing file");
        assert!(matches!(err, CatalogError::Read { .. }));
    }

    #[rstest]
    fn malformed_files_fail_to_decode(dir: TempDir) {
        let err = JsonCatalog::open(&write(&dir, r#"["not", "a", "map"]"#)).expect_err("bad JSON");
        assert!(matches!(err, CatalogError::Decode { .. }));
    }

    #[rstest]
    fn invalid_records_are_rejected(dir: TempDir) {
        let invalid = CATALOGUE.replace("\"visit_minutes\": 60", "\"visit_minutes\": 0");
        let err = JsonCatalog::open(&write(&dir, &invalid)).expect_err("zero duration");
        match err {
            CatalogError::InvalidRecord { city, id, .. } => {
                assert_eq!(city, "Springfield");
                assert_eq!(id, "gorge");
            }
            other => panic!("expected invalid record, got {other:?}"),
        }
    }
}
