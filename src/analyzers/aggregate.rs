use std::collections::BTreeMap;

use tracing::info;

use crate::analyzers::types::{DurationProfile, GroupCount, GroupMean, RiderShare, TripSummary};
use crate::analyzers::utility::{mean, median, pct, stddev};
use crate::trip::{RiderCategory, Trip};

/// Ride count and summed duration per (group, rider) cell.
///
/// Only cells with at least one ride exist; the map iterates in calendar
/// order, then rider order.
fn group_cells<K, F>(trips: &[Trip], key: F) -> BTreeMap<(K, RiderCategory), (usize, f64)>
where
    K: Ord + Copy,
    F: Fn(&Trip) -> K,
{
    let mut cells: BTreeMap<(K, RiderCategory), (usize, f64)> = BTreeMap::new();

    for trip in trips {
        let cell = cells.entry((key(trip), trip.member_casual)).or_default();
        cell.0 += 1;
        cell.1 += trip.ride_duration;
    }

    cells
}

/// Ride count per (group, rider category). Empty cells are absent.
pub fn count_by<K, F>(trips: &[Trip], key: F) -> Vec<GroupCount<K>>
where
    K: Ord + Copy,
    F: Fn(&Trip) -> K,
{
    group_cells(trips, key)
        .into_iter()
        .map(|((group, member_casual), (rides, _))| GroupCount {
            group,
            member_casual,
            rides,
        })
        .collect()
}

/// Mean `ride_duration` per (group, rider category). Empty cells are absent.
pub fn mean_duration_by<K, F>(trips: &[Trip], key: F) -> Vec<GroupMean<K>>
where
    K: Ord + Copy,
    F: Fn(&Trip) -> K,
{
    group_cells(trips, key)
        .into_iter()
        .map(|((group, member_casual), (rides, total))| GroupMean {
            group,
            member_casual,
            mean_duration: total / rides as f64,
        })
        .collect()
}

fn durations_by_rider(trips: &[Trip]) -> BTreeMap<RiderCategory, Vec<f64>> {
    let mut series: BTreeMap<RiderCategory, Vec<f64>> = BTreeMap::new();
    for trip in trips {
        series
            .entry(trip.member_casual)
            .or_default()
            .push(trip.ride_duration);
    }
    series
}

/// Rides per rider category as a share of all rides.
pub fn rider_share(trips: &[Trip]) -> Vec<RiderShare> {
    durations_by_rider(trips)
        .into_iter()
        .map(|(member_casual, series)| RiderShare {
            member_casual,
            rides: series.len(),
            share_pct: pct(series.len(), trips.len()),
        })
        .collect()
}

/// Mean, median, extremes and spread of `ride_duration` per rider category.
pub fn duration_profile(trips: &[Trip]) -> Vec<DurationProfile> {
    durations_by_rider(trips)
        .into_iter()
        .map(|(member_casual, series)| {
            let avg = mean(&series);
            DurationProfile {
                member_casual,
                rides: series.len(),
                mean: avg,
                median: median(&series),
                min: series.iter().copied().fold(f64::INFINITY, f64::min),
                max: series.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                stddev: stddev(&series, avg),
            }
        })
        .collect()
}

/// Computes every aggregate table over the cleaned trips.
#[tracing::instrument(skip_all, fields(rides = trips.len()))]
pub fn summarize(trips: &[Trip]) -> TripSummary {
    let summary = TripSummary {
        total_rides: trips.len(),
        rides_by_month: count_by(trips, |t| t.month),
        mean_duration_by_month: mean_duration_by(trips, |t| t.month),
        rides_by_weekday: count_by(trips, |t| t.week_day),
        mean_duration_by_weekday: mean_duration_by(trips, |t| t.week_day),
        rides_by_hour: count_by(trips, |t| t.hour_of_day),
        mean_duration_by_hour: mean_duration_by(trips, |t| t.hour_of_day),
        rider_share: rider_share(trips),
        duration_profile: duration_profile(trips),
    };

    for share in &summary.rider_share {
        info!(
            rider = %share.member_casual,
            rides = share.rides,
            share_pct = share.share_pct,
            "Rider share"
        );
    }

    summary
}
