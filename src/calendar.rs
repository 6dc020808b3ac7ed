//! Race calendar and the race-window projector.
//!
//! The calendar is an embedded, chronologically ordered list of race ids with
//! dates; fixed at build time and never mutated at runtime.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::severity::SeverityTier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceEntry {
    pub race_id: String,
    pub date: NaiveDate,
}

static CALENDAR: Lazy<Vec<RaceEntry>> = Lazy::new(|| {
    let raw = include_str!("../config/race_calendar.json");
    let mut races: Vec<RaceEntry> = serde_json::from_str(raw).expect("valid race calendar json");
    // Source file is kept chronological, but the projector depends on it.
    races.sort_by(|a, b| a.date.cmp(&b.date));
    races
});

/// Cached handle to the season calendar.
pub fn calendar() -> &'static [RaceEntry] {
    &CALENDAR
}

/// Result of projecting an absence window onto the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// Race ids inside the absence window, in calendar order.
    pub missed_races: Vec<String>,
    /// Expected return date (calendar date, no time-of-day).
    pub return_date: NaiveDate,
}

/// Compute the absence window for a severity tier.
///
/// The reference date falls back to `now` when absent or when it lies in the
/// future (an article claiming a future date is not trusted). A race on the
/// exact return date is NOT missed: the window is `[reference, return)`.
pub fn project(
    tier: SeverityTier,
    reference: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    races: &[RaceEntry],
) -> Projection {
    let reference = match reference {
        Some(d) if d <= now => d,
        _ => now,
    };
    let start = reference.date_naive();
    let return_date = start + Duration::days(tier.absence_days());

    let missed_races = races
        .iter()
        .filter(|r| r.date >= start && r.date < return_date)
        .map(|r| r.race_id.clone())
        .collect();

    Projection {
        missed_races,
        return_date,
    }
}
