//! Trip records at each stage of the cleaning pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One ride as ingested: the four retained columns, untyped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrip {
    pub ride_id: String,
    pub started_at: String,
    pub ended_at: String,
    pub member_casual: String,
}

/// A ride with parsed timestamps and its duration in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedTrip {
    pub ride_id: String,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
    pub member_casual: String,
    pub ride_duration: f64,
}

/// A [`TimedTrip`] with numeric calendar features taken from `started_at`.
///
/// `week_day` runs 1 (Sunday) through 7 (Saturday), `month` 1 through 12.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarTrip {
    pub ride_id: String,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
    pub member_casual: String,
    pub ride_duration: f64,
    pub week_day: u32,
    pub day_of_month: u32,
    pub month: u32,
    pub hour_of_day: u32,
}

/// A fully cleaned and labeled ride.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub ride_id: String,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
    pub member_casual: RiderCategory,
    pub ride_duration: f64,
    pub week_day: DayOfWeek,
    pub day_of_month: u32,
    pub month: MonthName,
    pub hour_of_day: u32,
}

/// Anything that carries a ride duration in minutes.
///
/// Lets the duration filters run on intermediate and cleaned tables alike.
pub trait RideDuration {
    fn ride_duration(&self) -> f64;
}

impl RideDuration for TimedTrip {
    fn ride_duration(&self) -> f64 {
        self.ride_duration
    }
}

impl RideDuration for CalendarTrip {
    fn ride_duration(&self) -> f64 {
        self.ride_duration
    }
}

impl RideDuration for Trip {
    fn ride_duration(&self) -> f64 {
        self.ride_duration
    }
}

/// Rider segment: subscription holders vs pass-based customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiderCategory {
    Member,
    Casual,
}

impl RiderCategory {
    pub const ALL: [RiderCategory; 2] = [RiderCategory::Member, RiderCategory::Casual];

    /// Maps the raw `member_casual` value. Matching is exact.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "member" => Some(RiderCategory::Member),
            "casual" => Some(RiderCategory::Casual),
            _ => None,
        }
    }
}

impl fmt::Display for RiderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    /// 1 = Sunday through 7 = Saturday.
    pub fn from_number(n: u32) -> Option<Self> {
        Some(match n {
            1 => DayOfWeek::Sunday,
            2 => DayOfWeek::Monday,
            3 => DayOfWeek::Tuesday,
            4 => DayOfWeek::Wednesday,
            5 => DayOfWeek::Thursday,
            6 => DayOfWeek::Friday,
            7 => DayOfWeek::Saturday,
            _ => return None,
        })
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MonthName {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl MonthName {
    /// 1 = Jan through 12 = Dec.
    pub fn from_number(n: u32) -> Option<Self> {
        Some(match n {
            1 => MonthName::Jan,
            2 => MonthName::Feb,
            3 => MonthName::Mar,
            4 => MonthName::Apr,
            5 => MonthName::May,
            6 => MonthName::Jun,
            7 => MonthName::Jul,
            8 => MonthName::Aug,
            9 => MonthName::Sep,
            10 => MonthName::Oct,
            11 => MonthName::Nov,
            12 => MonthName::Dec,
            _ => return None,
        })
    }
}

impl fmt::Display for MonthName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rider_category_from_raw() {
        assert_eq!(RiderCategory::from_raw("member"), Some(RiderCategory::Member));
        assert_eq!(RiderCategory::from_raw("casual"), Some(RiderCategory::Casual));
        assert_eq!(RiderCategory::from_raw("Member"), None);
        assert_eq!(RiderCategory::from_raw(""), None);
    }

    #[test]
    fn test_day_of_week_numbering_starts_on_sunday() {
        assert_eq!(DayOfWeek::from_number(1), Some(DayOfWeek::Sunday));
        assert_eq!(DayOfWeek::from_number(2), Some(DayOfWeek::Monday));
        assert_eq!(DayOfWeek::from_number(7), Some(DayOfWeek::Saturday));
        assert_eq!(DayOfWeek::from_number(0), None);
        assert_eq!(DayOfWeek::from_number(8), None);
    }

    #[test]
    fn test_month_name_numbering() {
        assert_eq!(MonthName::from_number(1), Some(MonthName::Jan));
        assert_eq!(MonthName::from_number(12), Some(MonthName::Dec));
        assert_eq!(MonthName::from_number(13), None);
        assert_eq!(MonthName::Mar.to_string(), "Mar");
    }
}
