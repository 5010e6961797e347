//! Grouped aggregates over the cleaned trip table.
//!
//! Rides are grouped by one calendar dimension (month, weekday or hour of
//! day) crossed with rider category, giving a count table and a mean
//! duration table per dimension, plus per-rider share and duration profile.

pub mod aggregate;
pub mod types;
pub mod utility;
