//! Month view for calendar renderers.

use chrono::NaiveDate;

use crate::dates::{self, CalendarDate};
use crate::{CalendarDay, LoggedDays, PredictionSet, Result};

/// Mark every day of a month with its logged and predicted state
pub fn month_view(
    year: i32,
    month: u32,
    logged_days: &LoggedDays,
    predictions: &PredictionSet,
    today: impl CalendarDate,
) -> Result<Vec<CalendarDay>> {
    let today = today.calendar_date();
    let (first, last) = dates::month_bounds(year, month)?;

    Ok(first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| mark_day(date, logged_days, predictions, today))
        .collect())
}

fn mark_day(
    date: NaiveDate,
    logged_days: &LoggedDays,
    predictions: &PredictionSet,
    today: NaiveDate,
) -> CalendarDay {
    CalendarDay {
        date,
        logged: logged_days.contains(date),
        predicted_period: predictions.predicted_periods.contains(&date),
        fertile: predictions.fertile_window.contains(&date),
        ovulation: predictions.ovulation_days.contains(&date),
        past: date < today,
        today: date == today,
    }
}
