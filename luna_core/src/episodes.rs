//! Period episode detection.
//!
//! Groups raw logged period days into episodes: maximal runs where each day
//! is at most one calendar day after the previous one. A gap of two or more
//! days starts a new episode.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{self, CalendarDate};

/// Largest gap (in whole days) that still continues the current episode
pub const MAX_EPISODE_GAP_DAYS: i64 = 1;

/// A contiguous run of logged period days
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Episode {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Episode {
    /// Number of calendar days covered, both ends included
    pub fn len_days(&self) -> i64 {
        dates::days_between(self.start_date, self.end_date) + 1
    }
}

/// Group logged days into episodes, oldest first.
///
/// Accepts unsorted input with duplicates and values carrying a time of day.
pub fn detect_episodes<I>(logged_days: I) -> Vec<Episode>
where
    I: IntoIterator,
    I::Item: CalendarDate,
{
    let days = dates::normalize_days(logged_days);
    let Some((&first, rest)) = days.split_first() else {
        return Vec::new();
    };

    let mut episodes = Vec::new();
    let mut current = Episode {
        start_date: first,
        end_date: first,
    };

    for &day in rest {
        if dates::days_between(current.end_date, day) > MAX_EPISODE_GAP_DAYS {
            episodes.push(current);
            current = Episode {
                start_date: day,
                end_date: day,
            };
        } else {
            current.end_date = day;
        }
    }
    episodes.push(current);

    tracing::debug!(
        "Detected {} episodes from {} logged days",
        episodes.len(),
        days.len()
    );
    episodes
}

/// Start date of every episode, strictly ascending
pub fn detect_episode_starts<I>(logged_days: I) -> Vec<NaiveDate>
where
    I: IntoIterator,
    I::Item: CalendarDate,
{
    detect_episodes(logged_days)
        .into_iter()
        .map(|e| e.start_date)
        .collect()
}
