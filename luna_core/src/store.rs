//! File-backed stores for logged period days and per-day records.
//!
//! Both stores are small JSON documents guarded by advisory file locks:
//! readers take a shared lock, writers replace the file atomically from a
//! locked temp file. Unreadable or damaged data never aborts a command; it is
//! reported and treated as empty, and individual malformed entries are
//! skipped.

use chrono::NaiveDate;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::dates::{format_iso, parse_iso_date};
use crate::{DayRecord, DayRecords, Error, LoggedDays, Result};

pub const PERIOD_DAYS_FILE: &str = "period_days.json";
pub const DAY_RECORDS_FILE: &str = "day_records.json";

/// Locations of the stores inside a data directory
#[derive(Clone, Debug)]
pub struct DataPaths {
    pub period_days: PathBuf,
    pub day_records: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            period_days: data_dir.join(PERIOD_DAYS_FILE),
            day_records: data_dir.join(DAY_RECORDS_FILE),
        }
    }
}

impl LoggedDays {
    /// Load logged days; a missing or damaged file yields an empty set
    pub fn load(path: &Path) -> Result<Self> {
        let Some(contents) = read_locked(path) else {
            return Ok(Self::default());
        };

        let raw = match serde_json::from_str::<Vec<String>>(&contents) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse period days file {:?}: {}. Using empty log.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        let days: LoggedDays = raw
            .iter()
            .filter_map(|s| match parse_iso_date(s) {
                Ok(day) => Some(day),
                Err(e) => {
                    tracing::warn!("Skipping malformed period day in {:?}: {}", path, e);
                    None
                }
            })
            .collect();

        tracing::debug!("Loaded {} period days from {:?}", days.len(), path);
        Ok(days)
    }

    /// Save logged days as an ascending array of ISO dates
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw: Vec<String> = self.iter().map(|d| format_iso(*d)).collect();
        write_atomic(path, &serde_json::to_string(&raw)?)?;
        tracing::debug!("Saved {} period days to {:?}", self.len(), path);
        Ok(())
    }

    /// Load, modify and save back
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut LoggedDays) -> Result<()>,
    {
        let lock = lock_for_update(path)?;
        let mut days = Self::load(path)?;
        f(&mut days)?;
        days.save(path)?;
        lock.unlock()?;
        Ok(days)
    }
}

impl DayRecords {
    /// Load day records; a missing or damaged file yields no records
    pub fn load(path: &Path) -> Result<Self> {
        let Some(contents) = read_locked(path) else {
            return Ok(Self::default());
        };

        let raw = match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&contents) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse day records file {:?}: {}. Using no records.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        let mut records = DayRecords::default();
        for (key, value) in raw {
            let date = match parse_iso_date(&key) {
                Ok(date) => date,
                Err(e) => {
                    tracing::warn!("Skipping day record with bad key in {:?}: {}", path, e);
                    continue;
                }
            };
            match serde_json::from_value::<DayRecord>(value) {
                Ok(record) => records.set(date, record),
                Err(e) => {
                    tracing::warn!("Skipping malformed day record for {}: {}", key, e);
                }
            }
        }

        tracing::debug!("Loaded {} day records from {:?}", records.len(), path);
        Ok(records)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &serde_json::to_string(self)?)?;
        tracing::debug!("Saved {} day records to {:?}", self.len(), path);
        Ok(())
    }

    /// Load, modify and save back
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut DayRecords) -> Result<()>,
    {
        let lock = lock_for_update(path)?;
        let mut records = Self::load(path)?;
        f(&mut records)?;
        records.save(path)?;
        lock.unlock()?;
        Ok(records)
    }

    /// Merge `record` into whatever is stored for `date`
    pub fn upsert(&mut self, date: NaiveDate, record: DayRecord) {
        let mut merged = self.get(date).cloned().unwrap_or_default();
        merged.merge(record);
        self.set(date, merged);
    }
}

/// Take an exclusive lock on `<path>.lock` for a whole load-modify-save.
///
/// The data file itself is replaced by rename on save, so it cannot carry a
/// lock across the update.
fn lock_for_update(path: &Path) -> Result<File> {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .ok_or_else(|| Error::Other(format!("data path {:?} has no file name", path)))?;
    name.push(".lock");
    let lock_path = path.with_file_name(name);

    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)?;
    file.lock_exclusive()?;
    Ok(file)
}

/// Read a whole file under a shared lock.
///
/// Returns `None` (after logging) when the file is absent or unreadable.
fn read_locked(path: &Path) -> Option<String> {
    if !path.exists() {
        tracing::info!("No data file at {:?}, starting empty", path);
        return None;
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open {:?}: {}. Starting empty.", path, e);
            return None;
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!("Unable to lock {:?}: {}. Starting empty.", path, e);
        return None;
    }

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    let _ = file.unlock();

    match read {
        Ok(_) => Some(contents),
        Err(e) => {
            tracing::warn!("Failed to read {:?}: {}. Starting empty.", path, e);
            None
        }
    }
}

/// Replace `path` with `contents` via a synced temp file in the same directory
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Other(format!("data path {:?} has no parent", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
