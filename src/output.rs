//! Output formatting and persistence for the cleaned table and its aggregates.
//!
//! Supports pretty-printing, JSON serialization, and one CSV file per table.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::TripSummary;
use crate::clean::CleaningReport;
use crate::trip::Trip;
use csv::WriterBuilder;
use std::fs::File;
use std::path::Path;

/// Cleaning audit and aggregates, as written to `summary.json`.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub cleaning: &'a CleaningReport,
    pub summary: &'a TripSummary,
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &Report<'_>) {
    debug!("{:#?}", report);
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &Report<'_>) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes `rows` to a CSV file at `path`, replacing any existing file.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the cleaned trips, one row per ride.
pub fn write_trips(path: &Path, trips: &[Trip]) -> Result<()> {
    write_table(path, trips)?;
    info!(path = %path.display(), rows = trips.len(), "Cleaned trips written");
    Ok(())
}

/// Writes every aggregate table as `<dir>/<table>.csv` plus the whole report
/// as `<dir>/summary.json`. Creates `dir` if needed.
pub fn write_report(dir: &Path, report: &Report<'_>) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let summary = report.summary;

    write_table(&dir.join("rides_by_month.csv"), &summary.rides_by_month)?;
    write_table(
        &dir.join("mean_duration_by_month.csv"),
        &summary.mean_duration_by_month,
    )?;
    write_table(&dir.join("rides_by_weekday.csv"), &summary.rides_by_weekday)?;
    write_table(
        &dir.join("mean_duration_by_weekday.csv"),
        &summary.mean_duration_by_weekday,
    )?;
    write_table(&dir.join("rides_by_hour.csv"), &summary.rides_by_hour)?;
    write_table(
        &dir.join("mean_duration_by_hour.csv"),
        &summary.mean_duration_by_hour,
    )?;
    write_table(&dir.join("rider_share.csv"), &summary.rider_share)?;
    write_table(&dir.join("duration_profile.csv"), &summary.duration_profile)?;

    let json = serde_json::to_vec_pretty(report)?;
    std::fs::write(dir.join("summary.json"), json)?;

    info!(dir = %dir.display(), "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::aggregate::summarize;
    use crate::clean::clean;
    use crate::trip::RawTrip;
    use std::fs;

    fn cleaned() -> crate::clean::Cleaned {
        clean(vec![
            RawTrip {
                ride_id: "r1".to_string(),
                started_at: "2024-04-02 07:45:00".to_string(),
                ended_at: "2024-04-02 08:00:00".to_string(),
                member_casual: "member".to_string(),
            },
            RawTrip {
                ride_id: "r2".to_string(),
                started_at: "2024-04-06 13:00:00".to_string(),
                ended_at: "2024-04-06 13:40:00".to_string(),
                member_casual: "casual".to_string(),
            },
        ])
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        let cleaned = cleaned();
        let summary = summarize(&cleaned.trips);
        print_pretty(&Report {
            cleaning: &cleaned.report,
            summary: &summary,
        });
    }

    #[test]
    fn test_print_json_does_not_panic() {
        let cleaned = cleaned();
        let summary = summarize(&cleaned.trips);
        print_json(&Report {
            cleaning: &cleaned.report,
            summary: &summary,
        })
        .unwrap();
    }

    #[test]
    fn test_write_report_creates_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report");
        let cleaned = cleaned();
        let summary = summarize(&cleaned.trips);

        write_report(
            &out,
            &Report {
                cleaning: &cleaned.report,
                summary: &summary,
            },
        )
        .unwrap();

        for name in [
            "rides_by_month.csv",
            "mean_duration_by_month.csv",
            "rides_by_weekday.csv",
            "mean_duration_by_weekday.csv",
            "rides_by_hour.csv",
            "mean_duration_by_hour.csv",
            "rider_share.csv",
            "duration_profile.csv",
            "summary.json",
        ] {
            assert!(out.join(name).exists(), "missing {name}");
        }

        let by_month = fs::read_to_string(out.join("rides_by_month.csv")).unwrap();
        let lines: Vec<_> = by_month.lines().collect();
        assert_eq!(
            lines,
            vec!["group,member_casual,rides", "Apr,Member,1", "Apr,Casual,1"]
        );

        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(out.join("summary.json")).unwrap()).unwrap();
        assert_eq!(json["cleaning"]["retained"], 2);
        assert_eq!(json["summary"]["total_rides"], 2);
    }

    #[test]
    fn test_write_trips_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trips.csv");
        let cleaned = cleaned();

        write_trips(&path, &cleaned.trips).unwrap();
        write_trips(&path, &cleaned.trips).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ride_id,started_at,ended_at,member_casual,ride_duration"));
        assert!(lines[1].starts_with("r1,2024-04-02T07:45:00,"));
    }
}
