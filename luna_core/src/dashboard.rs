//! Home dashboard summary.
//!
//! Answers "where am I in my cycle" for a reference day, using the same
//! anchor and fixed-length model as the predictor.

use chrono::NaiveDate;

use crate::dates::{self, CalendarDate};
use crate::predictor::{FERTILE_DAYS_BEFORE_OVULATION, LUTEAL_PHASE_DAYS};
use crate::{CycleConfig, CyclePhase, CycleSummary};

/// Summarize the cycle containing `today`.
///
/// Returns `None` when there is no episode to anchor on or the cycle length
/// is not positive.
pub fn summarize(
    episode_starts: &[NaiveDate],
    config: CycleConfig,
    today: impl CalendarDate,
) -> Option<CycleSummary> {
    let today = today.calendar_date();
    let cycle_length = config.cycle_length;
    if cycle_length <= 0 {
        return None;
    }
    let anchor = *episode_starts.iter().max()?;

    let days_since = dates::days_between(anchor, today);
    let cycle_day = days_since.rem_euclid(cycle_length) + 1;

    // First projected cycle start on or after today
    let cycles_ahead =
        days_since.div_euclid(cycle_length) + i64::from(days_since.rem_euclid(cycle_length) != 0);
    let next_period_start = dates::shift(anchor, cycles_ahead.checked_mul(cycle_length)?)?;
    let ovulation_day = dates::shift(next_period_start, -LUTEAL_PHASE_DAYS)?;
    let fertile_start = dates::shift(ovulation_day, -FERTILE_DAYS_BEFORE_OVULATION)?;

    let summary = CycleSummary {
        anchor,
        cycle_day,
        phase: phase_for_day(cycle_day, config),
        next_period_start,
        days_until_next_period: dates::days_between(today, next_period_start),
        ovulation_day,
        fertile_start,
        fertile_end: ovulation_day,
    };
    tracing::debug!(
        "Cycle day {} ({:?}), next period {}",
        summary.cycle_day,
        summary.phase,
        summary.next_period_start
    );
    Some(summary)
}

/// Phase for a 1-based cycle day.
///
/// Ovulation covers the modeled ovulation day and the day after it.
pub fn phase_for_day(cycle_day: i64, config: CycleConfig) -> CyclePhase {
    let ovulation_cycle_day = config.cycle_length - LUTEAL_PHASE_DAYS + 1;

    if cycle_day <= config.period_length {
        CyclePhase::Menstrual
    } else if cycle_day < ovulation_cycle_day {
        CyclePhase::Follicular
    } else if cycle_day <= ovulation_cycle_day + 1 {
        CyclePhase::Ovulation
    } else {
        CyclePhase::Luteal
    }
}
