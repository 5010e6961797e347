//! Row filtering and feature derivation.
//!
//! [`clean`] runs the fixed sequence: duration computation, short/invalid
//! filter, long-outlier filter, calendar features, stable sort by start time,
//! categorical relabeling. Every step takes its input table by value and
//! returns a new one, together with how many rows it removed.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analyzers::utility::pct;
use crate::trip::{
    CalendarTrip, DayOfWeek, MonthName, RawTrip, RideDuration, RiderCategory, TimedTrip, Trip,
};

/// Rides shorter than this many minutes are false starts or data errors.
pub const MIN_RIDE_MINUTES: f64 = 1.0;

/// Rides of 12 hours or more are treated as dock/return failures.
pub const MAX_RIDE_MINUTES: f64 = 720.0;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Rows removed at each cleaning step.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub unparseable_timestamps: usize,
    pub too_short: usize,
    pub too_long: usize,
    pub unknown_category: usize,
    /// Rows whose `ride_id` repeats an earlier row. Reported, never removed.
    pub duplicate_ride_ids: usize,
    pub retained: usize,
}

impl CleaningReport {
    pub fn removed(&self) -> usize {
        self.unparseable_timestamps + self.too_short + self.too_long + self.unknown_category
    }

    pub fn retained_pct(&self) -> f64 {
        pct(self.retained, self.input_rows)
    }

    fn log(&self) {
        info!(
            input_rows = self.input_rows,
            unparseable_timestamps = self.unparseable_timestamps,
            too_short = self.too_short,
            too_long = self.too_long,
            unknown_category = self.unknown_category,
            retained = self.retained,
            retained_pct = self.retained_pct(),
            "Cleaning complete"
        );

        if self.duplicate_ride_ids > 0 {
            warn!(
                duplicates = self.duplicate_ride_ids,
                "ride_id is not unique across the cleaned table"
            );
        }
    }
}

/// The cleaned table and its audit trail.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub trips: Vec<Trip>,
    pub report: CleaningReport,
}

/// Parses a local start/end timestamp. Fractional seconds and a missing
/// seconds field are both accepted.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Minutes between two timestamps; negative when `ended_at` precedes
/// `started_at`.
pub fn duration_minutes(started_at: NaiveDateTime, ended_at: NaiveDateTime) -> f64 {
    (ended_at - started_at).num_milliseconds() as f64 / 60_000.0
}

/// Parses both timestamps of every row and computes `ride_duration`.
///
/// Returns the timed rows and the number of rows whose timestamps did not
/// parse.
pub fn compute_durations(raw: Vec<RawTrip>) -> (Vec<TimedTrip>, usize) {
    let input = raw.len();

    let timed: Vec<TimedTrip> = raw
        .into_iter()
        .filter_map(|row| {
            let (Some(started_at), Some(ended_at)) = (
                parse_timestamp(&row.started_at),
                parse_timestamp(&row.ended_at),
            ) else {
                debug!(
                    ride_id = %row.ride_id,
                    started_at = %row.started_at,
                    ended_at = %row.ended_at,
                    "Unparseable timestamp"
                );
                return None;
            };

            Some(TimedTrip {
                ride_duration: duration_minutes(started_at, ended_at),
                ride_id: row.ride_id,
                started_at,
                ended_at,
                member_casual: row.member_casual,
            })
        })
        .collect();

    let unparseable = input - timed.len();
    (timed, unparseable)
}

/// Drops every row with `ride_duration < 1`, including negative durations.
pub fn drop_short_rides<T: RideDuration>(mut trips: Vec<T>) -> (Vec<T>, usize) {
    let before = trips.len();
    trips.retain(|t| t.ride_duration() >= MIN_RIDE_MINUTES);
    let removed = before - trips.len();
    (trips, removed)
}

/// Drops every row with `ride_duration >= 720`.
pub fn drop_long_rides<T: RideDuration>(mut trips: Vec<T>) -> (Vec<T>, usize) {
    let before = trips.len();
    trips.retain(|t| t.ride_duration() < MAX_RIDE_MINUTES);
    let removed = before - trips.len();
    (trips, removed)
}

/// Adds weekday (1 = Sunday), day of month, month and hour of day, all taken
/// from `started_at`.
pub fn derive_calendar_features(trips: Vec<TimedTrip>) -> Vec<CalendarTrip> {
    trips
        .into_iter()
        .map(|t| CalendarTrip {
            week_day: t.started_at.weekday().number_from_sunday(),
            day_of_month: t.started_at.day(),
            month: t.started_at.month(),
            hour_of_day: t.started_at.hour(),
            ride_id: t.ride_id,
            started_at: t.started_at,
            ended_at: t.ended_at,
            member_casual: t.member_casual,
            ride_duration: t.ride_duration,
        })
        .collect()
}

/// Stable ascending sort by `started_at`; ties keep their input order.
pub fn sort_by_start(mut trips: Vec<CalendarTrip>) -> Vec<CalendarTrip> {
    trips.sort_by_key(|t| t.started_at);
    trips
}

fn label_trip(trip: CalendarTrip) -> Option<Trip> {
    let Some(member_casual) = RiderCategory::from_raw(&trip.member_casual) else {
        debug!(ride_id = %trip.ride_id, value = %trip.member_casual, "Unrecognised rider category");
        return None;
    };

    Some(Trip {
        week_day: DayOfWeek::from_number(trip.week_day)?,
        month: MonthName::from_number(trip.month)?,
        ride_id: trip.ride_id,
        started_at: trip.started_at,
        ended_at: trip.ended_at,
        member_casual,
        ride_duration: trip.ride_duration,
        day_of_month: trip.day_of_month,
        hour_of_day: trip.hour_of_day,
    })
}

/// Maps raw categories and calendar numbers to their enumerations.
///
/// Rows with a category other than `member`/`casual` are rejected and
/// counted.
pub fn relabel(trips: Vec<CalendarTrip>) -> (Vec<Trip>, usize) {
    let before = trips.len();
    let labeled: Vec<Trip> = trips.into_iter().filter_map(label_trip).collect();
    let rejected = before - labeled.len();
    (labeled, rejected)
}

/// Number of rows whose `ride_id` already appeared earlier in the table.
pub fn count_duplicate_ride_ids(trips: &[Trip]) -> usize {
    let mut seen = HashSet::with_capacity(trips.len());
    trips
        .iter()
        .filter(|t| !seen.insert(t.ride_id.as_str()))
        .count()
}

/// Runs the full cleaning sequence over the unified table.
#[tracing::instrument(skip_all, fields(input_rows = raw.len()))]
pub fn clean(raw: Vec<RawTrip>) -> Cleaned {
    let mut report = CleaningReport {
        input_rows: raw.len(),
        ..Default::default()
    };

    let (timed, unparseable) = compute_durations(raw);
    report.unparseable_timestamps = unparseable;

    let (timed, too_short) = drop_short_rides(timed);
    report.too_short = too_short;

    let (timed, too_long) = drop_long_rides(timed);
    report.too_long = too_long;

    let dated = sort_by_start(derive_calendar_features(timed));

    let (trips, unknown) = relabel(dated);
    report.unknown_category = unknown;

    report.duplicate_ride_ids = count_duplicate_ride_ids(&trips);
    report.retained = trips.len();
    report.log();

    Cleaned { trips, report }
}
