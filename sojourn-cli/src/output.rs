//! Rendering outcomes to stdout and saving itineraries for later edits.

use std::io::Write;

use camino::Utf8Path;
use serde::Serialize;
use sojourn_core::{AttractionId, BuildOutcome, Infeasible, ItinerarySnapshot};

use crate::CliError;

/// JSON document printed by `plan` and `adjust`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum CommandReport<'a> {
    Planned {
        itinerary: ItinerarySnapshot,
        excluded: &'a [AttractionId],
        advice: &'a [String],
    },
    Infeasible {
        #[serde(flatten)]
        infeasible: &'a Infeasible,
        advice: &'a [String],
    },
}

impl<'a> CommandReport<'a> {
    fn new(outcome: &'a BuildOutcome, advice: &'a [String]) -> Self {
        match outcome {
            BuildOutcome::Planned(itinerary) => Self::Planned {
                itinerary: itinerary.snapshot(),
                excluded: itinerary.excluded(),
                advice,
            },
            BuildOutcome::Infeasible(infeasible) => Self::Infeasible { infeasible, advice },
        }
    }
}

pub(crate) fn write_outcome(
    writer: &mut dyn Write,
    outcome: &BuildOutcome,
    advice: &[String],
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(&CommandReport::new(outcome, advice))
        .map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

/// Save the full itinerary so `adjust` can pick it up later.
///
/// Infeasible outcomes leave any existing file untouched.
pub(crate) fn save_outcome(path: &Utf8Path, outcome: &BuildOutcome) -> Result<(), CliError> {
    let Some(itinerary) = outcome.itinerary() else {
        log::warn!("no itinerary to save to {path}");
        return Ok(());
    };
    let payload = serde_json::to_string_pretty(itinerary).map_err(CliError::SerialiseOutput)?;
    sojourn_fs::write_utf8(path, &payload).map_err(|source| CliError::SaveItinerary {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("saved itinerary to {path}");
    Ok(())
}
