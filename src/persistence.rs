//! Persistence layer for daily price files
//!
//! One JSON file per calendar day under `<storage-root>/tibber-price/`,
//! named `<YYYY-MM-DD>.json` and holding the day's raw records as
//! `[{"startsAt": ..., "total": ..., "tax": ...}, ...]`.
//!
//! Writes always overwrite. The new content goes to a sibling temp file
//! first and is renamed into place, so a reader never sees a torn file and
//! a stale or partial file left by an earlier run is simply replaced.

use crate::error::{PriceError, Result};
use crate::logging::get_logger;
use crate::tibber::types::{DailyPriceSeries, DayKey, PriceRecord};
use std::path::{Path, PathBuf};

/// Sub-directory of the storage root holding the day files
pub const STORAGE_DIR: &str = "tibber-price";

/// File-per-day store
pub struct DayStore {
    dir: PathBuf,
    logger: crate::logging::StructuredLogger,
}

impl DayStore {
    /// Create a store rooted at `<storage_root>/tibber-price`
    pub fn new<P: AsRef<Path>>(storage_root: P) -> Self {
        Self {
            dir: storage_root.as_ref().join(STORAGE_DIR),
            logger: get_logger("persistence"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `day`
    pub fn path_for(&self, day: DayKey) -> PathBuf {
        self.dir.join(day.file_name())
    }

    /// Load a day's series; absent, unreadable, unparsable or empty files fail
    pub async fn read_day(&self, day: DayKey) -> Result<DailyPriceSeries> {
        let path = self.path_for(day);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            PriceError::persistence(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let records = parse_records(&bytes).map_err(|e| {
            PriceError::persistence(format!("Cannot parse {}: {}", path.display(), e))
        })?;

        self.logger.debug(&format!(
            "Loaded {} price records for {} from disk",
            records.len(),
            day
        ));
        Ok(DailyPriceSeries::new(day, records))
    }

    /// Store a day's series, replacing any existing file
    pub async fn write_day(&self, series: &DailyPriceSeries) -> Result<()> {
        let day = series.day();
        let path = self.path_for(day);
        let tmp = self.dir.join(format!("{}.tmp", day.file_name()));

        let contents = serde_json::to_vec_pretty(series.records()).map_err(|e| {
            PriceError::persistence(format!("Cannot serialize prices for {}: {}", day, e))
        })?;

        let io_err = |what: &str, p: &Path, e: std::io::Error| {
            PriceError::persistence(format!("Cannot {} {}: {}", what, p.display(), e))
        };
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_err("create", self.dir.as_path(), e))?;
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| io_err("write", tmp.as_path(), e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_err("replace", path.as_path(), e))?;

        self.logger.debug(&format!(
            "Saved {} price records for {} to {}",
            series.len(),
            day,
            path.display()
        ));
        Ok(())
    }
}

/// Decode the contents of a day file
pub fn parse_records(bytes: &[u8]) -> Result<Vec<PriceRecord>> {
    let records: Vec<PriceRecord> = serde_json::from_slice(bytes)?;
    if records.is_empty() {
        return Err(PriceError::persistence("day file holds no records"));
    }
    Ok(records)
}
