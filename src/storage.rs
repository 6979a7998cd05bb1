use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::TripResult;
use crate::session::FinalizedTrip;

/// Finalized trip plus the thresholds it was computed with (JSON-serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripExport {
    pub trip: FinalizedTrip,
    pub config: EngineConfig,
    pub exported_at: DateTime<Utc>,
}

impl TripExport {
    pub fn new(trip: FinalizedTrip, config: EngineConfig) -> Self {
        Self {
            trip,
            config,
            exported_at: Utc::now(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> TripResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to JSON bytes
    pub fn to_json_bytes(&self) -> TripResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Persistence collaborator: receives the single record of a finished trip.
pub trait TripSink {
    fn persist(&self, export: &TripExport) -> TripResult<PathBuf>;
}

/// Writes one `trip_<reservation>_<timestamp>.json` per trip into a directory.
#[derive(Debug, Clone)]
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    pub fn new(dir: impl AsRef<Path>) -> TripResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn file_name(trip: &FinalizedTrip) -> String {
        let reservation: String = trip
            .identity
            .reservation_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!(
            "trip_{}_{}.json",
            reservation,
            trip.ended_at.format("%Y%m%d_%H%M%S")
        )
    }
}

impl TripSink for JsonDirSink {
    fn persist(&self, export: &TripExport) -> TripResult<PathBuf> {
        let path = self.dir.join(Self::file_name(&export.trip));
        fs::write(&path, export.to_json_bytes()?)?;
        info!("Saved trip {} to {}", export.trip.identity.reservation_id, path.display());
        Ok(path)
    }
}
