//! Data types produced by the aggregation stage.

use serde::Serialize;

use crate::trip::{DayOfWeek, MonthName, RiderCategory};

/// Number of rides in one (group, rider category) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount<K> {
    pub group: K,
    pub member_casual: RiderCategory,
    pub rides: usize,
}

/// Mean ride duration, in minutes, of one (group, rider category) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean<K> {
    pub group: K,
    pub member_casual: RiderCategory,
    pub mean_duration: f64,
}

/// Share of all cleaned rides taken by one rider category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiderShare {
    pub member_casual: RiderCategory,
    pub rides: usize,
    pub share_pct: f64,
}

/// Descriptive statistics of `ride_duration` for one rider category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationProfile {
    pub member_casual: RiderCategory,
    pub rides: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

/// Every aggregate table computed from one cleaned table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    pub total_rides: usize,
    pub rides_by_month: Vec<GroupCount<MonthName>>,
    pub mean_duration_by_month: Vec<GroupMean<MonthName>>,
    pub rides_by_weekday: Vec<GroupCount<DayOfWeek>>,
    pub mean_duration_by_weekday: Vec<GroupMean<DayOfWeek>>,
    pub rides_by_hour: Vec<GroupCount<u32>>,
    pub mean_duration_by_hour: Vec<GroupMean<u32>>,
    pub rider_share: Vec<RiderShare>,
    pub duration_profile: Vec<DurationProfile>,
}
