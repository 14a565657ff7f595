//! CSV export of tracked and predicted days.
//!
//! One row per calendar day that has a logged period day, a day record or a
//! prediction, in date order. Multi-valued fields are joined with `;`.

use crate::{DayRecord, DayRecords, LoggedDays, PredictionSet, Result};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    logged_period: bool,
    predicted_period: bool,
    fertile: bool,
    ovulation: bool,
    flow: Option<String>,
    symptoms: String,
    moods: String,
    sex: Option<String>,
    sex_drive: Option<String>,
    discharge: Option<String>,
    pill: Option<String>,
    breast: Option<String>,
    psychological: String,
    notes: String,
}

impl CsvRow {
    fn new(
        date: NaiveDate,
        logged_days: &LoggedDays,
        record: Option<&DayRecord>,
        predictions: &PredictionSet,
    ) -> Self {
        let join = |items: Vec<&str>| items.join(";");

        CsvRow {
            date: crate::dates::format_iso(date),
            logged_period: logged_days.contains(date),
            predicted_period: predictions.predicted_periods.contains(&date),
            fertile: predictions.fertile_window.contains(&date),
            ovulation: predictions.ovulation_days.contains(&date),
            flow: record.and_then(|r| r.flow).map(|f| f.to_string()),
            symptoms: record
                .map(|r| join(r.symptoms.iter().map(|s| s.as_str()).collect()))
                .unwrap_or_default(),
            moods: record
                .map(|r| join(r.moods.iter().map(|m| m.as_str()).collect()))
                .unwrap_or_default(),
            sex: record.and_then(|r| r.sex).map(|v| v.to_string()),
            sex_drive: record.and_then(|r| r.sex_drive).map(|v| v.to_string()),
            discharge: record.and_then(|r| r.discharge).map(|v| v.to_string()),
            pill: record.and_then(|r| r.pill).map(|v| v.to_string()),
            breast: record.and_then(|r| r.breast).map(|v| v.to_string()),
            psychological: record
                .map(|r| join(r.psychological.iter().map(|p| p.as_str()).collect()))
                .unwrap_or_default(),
            notes: record.map(|r| r.notes.clone()).unwrap_or_default(),
        }
    }
}

/// Write the CSV export to `path`, replacing any existing file.
///
/// Returns the number of data rows written.
pub fn export_csv(
    logged_days: &LoggedDays,
    records: &DayRecords,
    predictions: &PredictionSet,
    path: &Path,
) -> Result<usize> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let dates: BTreeSet<NaiveDate> = logged_days
        .iter()
        .copied()
        .chain(records.dates())
        .chain(predictions.predicted_periods.iter().copied())
        .chain(predictions.fertile_window.iter().copied())
        .chain(predictions.ovulation_days.iter().copied())
        .collect();

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(file);

    for date in &dates {
        writer.serialize(CsvRow::new(*date, logged_days, records.get(*date), predictions))?;
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} days to {:?}", dates.len(), path);
    Ok(dates.len())
}
