//! Core domain types for Luna.
//!
//! This module defines the fundamental types used throughout the system:
//! - Logged period days and the cycle configuration
//! - Prediction output
//! - Per-day symptom records
//! - Dashboard and calendar views

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::{BTreeMap, BTreeSet};

use crate::dates;

// ============================================================================
// Logged Days
// ============================================================================

/// The set of calendar days the user marked as period days.
///
/// Unique by date and always iterated in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoggedDays(BTreeSet<NaiveDate>);

impl LoggedDays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a single day. Returns false if it was already logged.
    pub fn add_day(&mut self, day: NaiveDate) -> bool {
        self.0.insert(day)
    }

    /// Mark `days` consecutive days starting at `start`.
    ///
    /// Returns how many of them were newly added.
    pub fn add_block(&mut self, start: NaiveDate, days: u32) -> usize {
        (0..i64::from(days))
            .filter_map(|offset| dates::shift(start, offset))
            .filter(|day| self.0.insert(*day))
            .count()
    }

    /// Unmark a day. Returns false if it was not logged.
    pub fn remove_day(&mut self, day: NaiveDate) -> bool {
        self.0.remove(&day)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.0.contains(&day)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, NaiveDate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.0.last().copied()
    }
}

impl FromIterator<NaiveDate> for LoggedDays {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LoggedDays {
    type Item = &'a NaiveDate;
    type IntoIter = btree_set::Iter<'a, NaiveDate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Cycle Configuration
// ============================================================================

pub const MIN_CYCLE_LENGTH: i64 = 21;
pub const MAX_CYCLE_LENGTH: i64 = 45;
pub const MIN_PERIOD_LENGTH: i64 = 1;
pub const MAX_PERIOD_LENGTH: i64 = 10;

/// Fixed cycle and period lengths supplied by the user profile.
///
/// Signed so that degenerate values coming from a damaged profile can still
/// be handed to the predictor, which answers them with empty output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    pub cycle_length: i64,
    pub period_length: i64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_length: 28,
            period_length: 5,
        }
    }
}

impl CycleConfig {
    pub fn new(cycle_length: i64, period_length: i64) -> Self {
        Self {
            cycle_length,
            period_length,
        }
    }

    /// Check both lengths against the onboarding domains.
    pub fn validate(&self) -> crate::Result<()> {
        if !(MIN_CYCLE_LENGTH..=MAX_CYCLE_LENGTH).contains(&self.cycle_length) {
            return Err(crate::Error::Config(format!(
                "cycle_length must be between {} and {} days, got {}",
                MIN_CYCLE_LENGTH, MAX_CYCLE_LENGTH, self.cycle_length
            )));
        }
        if !(MIN_PERIOD_LENGTH..=MAX_PERIOD_LENGTH).contains(&self.period_length) {
            return Err(crate::Error::Config(format!(
                "period_length must be between {} and {} days, got {}",
                MIN_PERIOD_LENGTH, MAX_PERIOD_LENGTH, self.period_length
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Prediction Output
// ============================================================================

/// Output of the cycle predictor. Each set is ascending and duplicate-free.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionSet {
    pub predicted_periods: BTreeSet<NaiveDate>,
    pub fertile_window: BTreeSet<NaiveDate>,
    pub ovulation_days: BTreeSet<NaiveDate>,
}

impl PredictionSet {
    pub fn is_empty(&self) -> bool {
        self.predicted_periods.is_empty()
            && self.fertile_window.is_empty()
            && self.ovulation_days.is_empty()
    }
}

// ============================================================================
// Day Records
// ============================================================================

/// Declares a plain string-backed enum with serde names, `as_str`, `Display`
/// and `FromStr` so the CLI and the CSV export share one spelling.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                let wanted = s.trim().to_lowercase().replace('-', "_");
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let known: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        crate::Error::Other(format!(
                            "unknown {} '{}' (expected one of: {})",
                            stringify!($name),
                            s,
                            known.join(", ")
                        ))
                    })
            }
        }
    };
}

string_enum! {
    /// What the user is tracking for
    pub enum Goal {
        Tracking => "tracking",
        Fertility => "fertility",
    }
}

impl Default for Goal {
    fn default() -> Self {
        Goal::Tracking
    }
}

string_enum! {
    /// Menstrual flow intensity
    pub enum Flow {
        Spotting => "spotting",
        Light => "light",
        Medium => "medium",
        Heavy => "heavy",
    }
}

string_enum! {
    pub enum Symptom {
        Cramps => "cramps",
        Headache => "headache",
        Nausea => "nausea",
        Fatigue => "fatigue",
        Bloating => "bloating",
        Backache => "backache",
        Acne => "acne",
    }
}

string_enum! {
    pub enum Mood {
        Happy => "happy",
        Calm => "calm",
        Sad => "sad",
        Anxious => "anxious",
        Irritable => "irritable",
        Energetic => "energetic",
    }
}

string_enum! {
    pub enum SexualActivity {
        Protected => "protected",
        Unprotected => "unprotected",
        None => "none",
    }
}

string_enum! {
    pub enum SexDrive {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

string_enum! {
    /// Cervical discharge consistency
    pub enum Discharge {
        None => "none",
        Sticky => "sticky",
        Creamy => "creamy",
        Watery => "watery",
        EggWhite => "egg_white",
    }
}

string_enum! {
    pub enum PillStatus {
        Taken => "taken",
        Missed => "missed",
        NotApplicable => "not_applicable",
    }
}

string_enum! {
    /// Breast tenderness
    pub enum Breast {
        Normal => "normal",
        Tender => "tender",
        Sore => "sore",
    }
}

string_enum! {
    /// Mental capacity over the day
    pub enum Psychological {
        Focused => "focused",
        Productive => "productive",
        Distracted => "distracted",
        Unproductive => "unproductive",
    }
}

/// Everything the user tracked for one calendar day
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<Flow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symptoms: Vec<Symptom>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub moods: Vec<Mood>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<SexualActivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex_drive: Option<SexDrive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge: Option<Discharge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pill: Option<PillStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breast: Option<Breast>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub psychological: Vec<Psychological>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl DayRecord {
    pub fn is_empty(&self) -> bool {
        self == &DayRecord::default()
    }

    /// Overlay the fields set in `other` onto this record.
    ///
    /// Single-valued fields are replaced when present in `other`; lists are
    /// replaced when `other` has any entries; notes when non-empty.
    pub fn merge(&mut self, other: DayRecord) {
        if other.flow.is_some() {
            self.flow = other.flow;
        }
        if !other.symptoms.is_empty() {
            self.symptoms = other.symptoms;
        }
        if !other.moods.is_empty() {
            self.moods = other.moods;
        }
        if other.sex.is_some() {
            self.sex = other.sex;
        }
        if other.sex_drive.is_some() {
            self.sex_drive = other.sex_drive;
        }
        if other.discharge.is_some() {
            self.discharge = other.discharge;
        }
        if other.pill.is_some() {
            self.pill = other.pill;
        }
        if other.breast.is_some() {
            self.breast = other.breast;
        }
        if !other.psychological.is_empty() {
            self.psychological = other.psychological;
        }
        if !other.notes.is_empty() {
            self.notes = other.notes;
        }
    }
}

/// Day records keyed by calendar date
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DayRecords(BTreeMap<NaiveDate, DayRecord>);

impl DayRecords {
    pub fn get(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.0.get(&date)
    }

    /// Store a record, dropping the entry entirely if the record is empty.
    pub fn set(&mut self, date: NaiveDate, record: DayRecord) {
        if record.is_empty() {
            self.0.remove(&date);
        } else {
            self.0.insert(date, record);
        }
    }

    pub fn remove(&mut self, date: NaiveDate) -> Option<DayRecord> {
        self.0.remove(&date)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayRecord)> {
        self.0.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Dashboard and Calendar Views
// ============================================================================

/// Named phase of the menstrual cycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
}

impl CyclePhase {
    pub fn name(&self) -> &'static str {
        match self {
            CyclePhase::Menstrual => "Menstrual",
            CyclePhase::Follicular => "Follicular",
            CyclePhase::Ovulation => "Ovulation",
            CyclePhase::Luteal => "Luteal",
        }
    }
}

/// Where the user is in the current cycle, as seen from a reference day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleSummary {
    pub anchor: NaiveDate,
    /// 1-based day within the current cycle
    pub cycle_day: i64,
    pub phase: CyclePhase,
    pub next_period_start: NaiveDate,
    pub days_until_next_period: i64,
    pub ovulation_day: NaiveDate,
    pub fertile_start: NaiveDate,
    pub fertile_end: NaiveDate,
}

/// Markers for one day of a month view
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub logged: bool,
    pub predicted_period: bool,
    pub fertile: bool,
    pub ovulation: bool,
    /// Before the reference day; renderers fade these
    pub past: bool,
    pub today: bool,
}
