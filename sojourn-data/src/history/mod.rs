//! Traveller preferences and visit history persisted in SQLite.
//!
//! Two tables back the store: `preferences` keyed by user and subject, and
//! `visits` keyed by user, city and attraction. Writes are upserts, so
//! recording the same fact twice leaves a single row and a newer sentiment
//! replaces an older one.

use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use rusqlite::{Connection, OptionalExtension, Transaction};
use sojourn_core::{
    AttractionId, Category, HistoryStore, Preference, PreferenceSubject, Sentiment, SourceError,
    UserHistory,
};
use thiserror::Error;

/// Version of the history schema this build reads and writes.
pub const SCHEMA_VERSION: i64 = 1;

/// Errors raised by [`SqliteHistoryStore`].
#[derive(Debug, Error)]
pub enum HistoryStoreError {
    /// The database directory could not be created.
    #[error("failed to prepare directory for history database {path}")]
    CreateDir {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The database could not be opened.
    #[error("failed to open history database {path}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying SQLite failure.
        #[source]
        source: rusqlite::Error,
    },
    /// A statement failed.
    #[error("failed to {step}")]
    Sqlite {
        /// What the store was doing.
        step: &'static str,
        /// Underlying SQLite failure.
        #[source]
        source: rusqlite::Error,
    },
    /// The database was written by an incompatible build.
    #[error("expected history schema version {expected} but found {found}")]
    VersionMismatch {
        /// Version this build understands.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
    /// A stored preference could not be decoded.
    #[error("stored preference ({kind}, {subject:?}, {relationship}) is not recognised")]
    CorruptPreference {
        /// Stored subject kind.
        kind: String,
        /// Stored subject.
        subject: String,
        /// Stored relationship.
        relationship: String,
    },
}

impl From<HistoryStoreError> for SourceError {
    fn from(error: HistoryStoreError) -> Self {
        let message = match std::error::Error::source(&error) {
            Some(source) => format!("{error}: {source}"),
            None => error.to_string(),
        };
        Self::Storage { message }
    }
}

fn sql(step: &'static str) -> impl Fn(rusqlite::Error) -> HistoryStoreError {
    move |source| HistoryStoreError::Sqlite { step, source }
}

/// [`HistoryStore`] backed by a SQLite database.
///
/// The connection sits behind a mutex, so one store can be shared between
/// threads; calls are serialised.
///
/// # Examples
/// ```
/// use sojourn_core::{
///     AttractionId, Category, HistoryStore, Preference, PreferenceSubject, Sentiment,
/// };
/// use sojourn_data::history::SqliteHistoryStore;
///
/// let store = SqliteHistoryStore::open_in_memory()?;
/// store.record_visit("ada", "Paris", &[AttractionId::from("louvre")])?;
/// store.record_preference(
///     "ada",
///     &Preference {
///         subject: PreferenceSubject::Category(Category::Art),
///         sentiment: Sentiment::Likes,
///     },
/// )?;
///
/// let history = store.preferences_for("ada")?;
/// assert!(history.visited_in("Paris").contains("louvre"));
/// assert!(history.categories(Sentiment::Likes).contains(&Category::Art));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SqliteHistoryStore {
    connection: Mutex<Connection>,
}

impl SqliteHistoryStore {
    /// Open or create the database at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryStoreError`] when the directory or database cannot be
    /// created or the schema cannot be initialised.
    pub fn open(path: &Utf8Path) -> Result<Self, HistoryStoreError> {
        sojourn_fs::ensure_parent_dir(path).map_err(|source| HistoryStoreError::CreateDir {
            path: path.to_path_buf(),
            source,
        })?;
        let connection = Connection::open(path).map_err(|source| HistoryStoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("opened history database {path}");
        Self::from_connection(connection)
    }

    /// A private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryStoreError`] when the schema cannot be initialised.
    pub fn open_in_memory() -> Result<Self, HistoryStoreError> {
        let connection = Connection::open_in_memory().map_err(sql("open in-memory database"))?;
        Self::from_connection(connection)
    }

    fn from_connection(mut connection: Connection) -> Result<Self, HistoryStoreError> {
        initialise_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn with_connection<R>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<R, HistoryStoreError>,
    ) -> Result<R, HistoryStoreError> {
        let mut guard = self
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn load(&self, user: &str) -> Result<UserHistory, HistoryStoreError> {
        self.with_connection(|connection| {
            let mut history = UserHistory::default();

            let mut visits = connection
                .prepare_cached(
                    "SELECT city, attraction_id FROM visits
                        WHERE user_id = ?1 ORDER BY city, attraction_id",
                )
                .map_err(sql("prepare visit query"))?;
            let visit_rows = visits
                .query_map([user], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
                .map_err(sql("query visits"))?;
            for row in visit_rows {
                let (city, id) = row.map_err(sql("read visit row"))?;
                history
                    .visits
                    .entry(city)
                    .or_default()
                    .insert(AttractionId::from(id));
            }

            let mut preferences = connection
                .prepare_cached(
                    "SELECT subject_kind, subject, relationship FROM preferences
                        WHERE user_id = ?1",
                )
                .map_err(sql("prepare preference query"))?;
            let preference_rows = preferences
                .query_map([user], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .map_err(sql("query preferences"))?;
            for row in preference_rows {
                let (kind, subject, relationship) = row.map_err(sql("read preference row"))?;
                history
                    .preferences
                    .insert(decode_preference(kind, subject, relationship)?);
            }
            Ok(history)
        })
    }

    fn insert_visits(
        &self,
        user: &str,
        city: &str,
        attractions: &[AttractionId],
    ) -> Result<(), HistoryStoreError> {
        self.with_connection(|connection| {
            let transaction = connection
                .transaction()
                .map_err(sql("begin visit transaction"))?;
            {
                let mut insert = transaction
                    .prepare_cached(
                        "INSERT INTO visits (user_id, city, attraction_id)
                            VALUES (?1, ?2, ?3)
                            ON CONFLICT (user_id, city, attraction_id) DO NOTHING",
                    )
                    .map_err(sql("prepare insert visit"))?;
                for id in attractions {
                    insert
                        .execute((user, city, id.as_str()))
                        .map_err(sql("insert visit"))?;
                }
            }
            transaction
                .commit()
                .map_err(sql("commit visit transaction"))
        })
    }

    fn upsert_preference(
        &self,
        user: &str,
        preference: &Preference,
    ) -> Result<(), HistoryStoreError> {
        let (kind, subject) = match &preference.subject {
            PreferenceSubject::Category(category) => ("category", category.as_str()),
            PreferenceSubject::Attraction(id) => ("attraction", id.as_str()),
        };
        let relationship = match preference.sentiment {
            Sentiment::Likes => "likes",
            Sentiment::Dislikes => "dislikes",
        };
        self.with_connection(|connection| {
            connection
                .execute(
                    "INSERT INTO preferences (user_id, subject_kind, subject, relationship)
                        VALUES (?1, ?2, ?3, ?4)
                        ON CONFLICT (user_id, subject_kind, subject)
                        DO UPDATE SET relationship = excluded.relationship",
                    (user, kind, subject, relationship),
                )
                .map(|_| ())
                .map_err(sql("upsert preference"))
        })
    }
}

fn decode_preference(
    kind: String,
    subject: String,
    relationship: String,
) -> Result<Preference, HistoryStoreError> {
    let sentiment = match relationship.as_str() {
        "likes" => Some(Sentiment::Likes),
        "dislikes" => Some(Sentiment::Dislikes),
        _ => None,
    };
    let decoded = match kind.as_str() {
        "category" => Category::from_str(&subject)
            .ok()
            .map(PreferenceSubject::Category),
        "attraction" => Some(PreferenceSubject::Attraction(AttractionId::from(
            subject.as_str(),
        ))),
        _ => None,
    };
    match (decoded, sentiment) {
        (Some(subject_value), Some(sentiment_value)) => Ok(Preference {
            subject: subject_value,
            sentiment: sentiment_value,
        }),
        _ => Err(HistoryStoreError::CorruptPreference {
            kind,
            subject,
            relationship,
        }),
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn preferences_for(&self, user: &str) -> Result<UserHistory, SourceError> {
        Ok(self.load(user)?)
    }

    fn record_visit(
        &self,
        user: &str,
        city: &str,
        attractions: &[AttractionId],
    ) -> Result<(), SourceError> {
        Ok(self.insert_visits(user, city, attractions)?)
    }

    fn record_preference(&self, user: &str, preference: &Preference) -> Result<(), SourceError> {
        Ok(self.upsert_preference(user, preference)?)
    }
}

fn initialise_schema(connection: &mut Connection) -> Result<(), HistoryStoreError> {
    let transaction = connection
        .transaction()
        .map_err(sql("begin schema transaction"))?;
    run_migration_step(
        &transaction,
        "create preferences",
        "CREATE TABLE IF NOT EXISTS preferences (
            user_id TEXT NOT NULL CHECK (length(trim(user_id)) > 0),
            subject_kind TEXT NOT NULL CHECK (subject_kind IN ('category', 'attraction')),
            subject TEXT NOT NULL,
            relationship TEXT NOT NULL CHECK (relationship IN ('likes', 'dislikes')),
            PRIMARY KEY (user_id, subject_kind, subject)
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        &transaction,
        "create visits",
        "CREATE TABLE IF NOT EXISTS visits (
            user_id TEXT NOT NULL CHECK (length(trim(user_id)) > 0),
            city TEXT NOT NULL,
            attraction_id TEXT NOT NULL,
            PRIMARY KEY (user_id, city, attraction_id)
        ) WITHOUT ROWID",
    )?;
    ensure_schema_version(&transaction)?;
    transaction.commit().map_err(sql("commit schema transaction"))
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), HistoryStoreError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS history_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0)
        ) WITHOUT ROWID",
    )?;

    let existing: Option<i64> = transaction
        .query_row(
            "SELECT version FROM history_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(sql("read schema version"))?;

    match existing {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(HistoryStoreError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO history_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(sql("record schema version")),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    statement: &str,
) -> Result<(), HistoryStoreError> {
    transaction
        .execute(statement, [])
        .map(|_| ())
        .map_err(sql(step))
}
