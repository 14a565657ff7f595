//! Cycle prediction.
//!
//! Projects period, fertile-window and ovulation days from the latest known
//! episode start using a fixed cycle length:
//!
//! - every cycle start is `anchor + i * cycle_length` for `i` in `[-W, W]`
//! - ovulation falls `LUTEAL_PHASE_DAYS` before the *next* cycle start
//! - the fertile window is the five days before ovulation plus ovulation day
//! - predicted period days are only reported from the reference day onward
//!   and never for a day that is already logged
//!
//! The prediction is a pure function of its inputs.

use chrono::NaiveDate;

use crate::dates::{self, CalendarDate};
use crate::episodes::detect_episode_starts;
use crate::{CycleConfig, LoggedDays, PredictionSet, MAX_PERIOD_LENGTH, MIN_PERIOD_LENGTH};

/// Days between ovulation and the start of the next period
pub const LUTEAL_PHASE_DAYS: i64 = 14;

/// Fertile days preceding ovulation day
pub const FERTILE_DAYS_BEFORE_OVULATION: i64 = 5;

/// Cycles projected on each side of the anchor
pub const DEFAULT_CYCLE_WINDOW: u32 = 6;

/// Largest window honored; larger requests are clamped
pub const MAX_CYCLE_WINDOW: u32 = 36;

/// Predictor bound to one cycle configuration and projection window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CyclePredictor {
    config: CycleConfig,
    window: u32,
}

impl CyclePredictor {
    pub fn new(config: CycleConfig) -> Self {
        Self {
            config,
            window: DEFAULT_CYCLE_WINDOW,
        }
    }

    /// Override the number of cycles projected each side of the anchor
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    pub fn config(&self) -> CycleConfig {
        self.config
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    /// Detect episodes in `logged_days` and predict from them
    pub fn predict(&self, logged_days: &LoggedDays, today: impl CalendarDate) -> PredictionSet {
        let starts = detect_episode_starts(logged_days);
        self.predict_from_starts(&starts, logged_days, today)
    }

    /// Predict from already-detected episode starts
    pub fn predict_from_starts(
        &self,
        episode_starts: &[NaiveDate],
        logged_days: &LoggedDays,
        today: impl CalendarDate,
    ) -> PredictionSet {
        project(
            episode_starts,
            logged_days,
            self.config,
            self.window,
            today.calendar_date(),
        )
    }
}

/// Predict with the default projection window.
///
/// Empty `episode_starts`, a non-positive cycle length or a period length
/// outside `1..=10` yield an empty prediction rather than an error.
pub fn predict_cycle(
    episode_starts: &[NaiveDate],
    logged_days: &LoggedDays,
    config: CycleConfig,
    today: impl CalendarDate,
) -> PredictionSet {
    CyclePredictor::new(config).predict_from_starts(episode_starts, logged_days, today)
}

fn project(
    episode_starts: &[NaiveDate],
    logged_days: &LoggedDays,
    config: CycleConfig,
    window: u32,
    today: NaiveDate,
) -> PredictionSet {
    let mut predictions = PredictionSet::default();

    if config.cycle_length <= 0 {
        tracing::warn!(
            "Cycle length {} is not positive, skipping prediction",
            config.cycle_length
        );
        return predictions;
    }

    if !(MIN_PERIOD_LENGTH..=MAX_PERIOD_LENGTH).contains(&config.period_length) {
        tracing::warn!(
            "Period length {} is outside {}..={}, skipping prediction",
            config.period_length,
            MIN_PERIOD_LENGTH,
            MAX_PERIOD_LENGTH
        );
        return predictions;
    }

    let Some(&anchor) = episode_starts.iter().max() else {
        tracing::warn!("No episode starts, nothing to predict");
        return predictions;
    };

    if window > MAX_CYCLE_WINDOW {
        tracing::warn!(
            "Cycle window {} exceeds {}, clamping",
            window,
            MAX_CYCLE_WINDOW
        );
    }
    let window = i64::from(window.min(MAX_CYCLE_WINDOW));
    for i in -window..=window {
        let Some(cycle_start) = i
            .checked_mul(config.cycle_length)
            .and_then(|offset| dates::shift(anchor, offset))
        else {
            continue;
        };

        for day in (0..config.period_length).filter_map(|d| dates::shift(cycle_start, d)) {
            if day >= today && !logged_days.contains(day) {
                predictions.predicted_periods.insert(day);
            }
        }

        let Some(ovulation) = dates::shift(cycle_start, config.cycle_length - LUTEAL_PHASE_DAYS)
        else {
            continue;
        };
        predictions.ovulation_days.insert(ovulation);
        predictions.fertile_window.extend(
            (-FERTILE_DAYS_BEFORE_OVULATION..=0).filter_map(|d| dates::shift(ovulation, d)),
        );
    }

    tracing::debug!(
        "Predicted {} period days, {} fertile days, {} ovulation days from anchor {}",
        predictions.predicted_periods.len(),
        predictions.fertile_window.len(),
        predictions.ovulation_days.len(),
        anchor
    );
    predictions
}
