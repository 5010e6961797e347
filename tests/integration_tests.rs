use std::io::Write;

use tripdata_profiler::analyzers::aggregate::summarize;
use tripdata_profiler::clean::{MAX_RIDE_MINUTES, MIN_RIDE_MINUTES, clean};
use tripdata_profiler::error::PipelineError;
use tripdata_profiler::fetch::BasicClient;
use tripdata_profiler::ingest::{ingest_all, read_trips};
use tripdata_profiler::sources::Source;
use tripdata_profiler::trip::{DayOfWeek, MonthName, RiderCategory};
use zip::CompressionMethod;
use zip::write::FileOptions;

const SAMPLE: &str = include_str!("fixtures/sample_trips.csv");

fn write_zip(path: &std::path::Path, member: &str, content: &str) {
    let file = std::fs::File::create(path).expect("create archive");
    let mut zip = zip::ZipWriter::new(file);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(member, options).expect("start member");
    zip.write_all(content.as_bytes()).expect("write member");
    zip.finish().expect("finish archive");
}

#[test]
fn test_full_pipeline() {
    let raw = read_trips(SAMPLE.as_bytes(), "fixture").expect("Failed to read fixture");
    assert_eq!(raw.len(), 7);

    let cleaned = clean(raw);

    // sub-minute, negative and >12h rides removed
    assert_eq!(cleaned.report.too_short, 2);
    assert_eq!(cleaned.report.too_long, 1);
    assert_eq!(cleaned.report.retained, 4);
    assert_eq!(cleaned.report.duplicate_ride_ids, 0);

    for trip in &cleaned.trips {
        assert!(trip.ride_duration >= MIN_RIDE_MINUTES);
        assert!(trip.ride_duration < MAX_RIDE_MINUTES);
        assert_eq!(trip.month, MonthName::Jan);
    }
    assert!(
        cleaned
            .trips
            .windows(2)
            .all(|w| w[0].started_at <= w[1].started_at)
    );

    let first = &cleaned.trips[0];
    assert_eq!(first.ride_id, "A2BECB88430BE156");
    assert_eq!(first.week_day, DayOfWeek::Monday);
    assert_eq!(first.hour_of_day, 15);

    let summary = summarize(&cleaned.trips);
    let total: usize = summary.rides_by_month.iter().map(|c| c.rides).sum();
    assert_eq!(total, cleaned.trips.len());
    assert!(
        summary
            .rides_by_weekday
            .iter()
            .any(|c| c.group == DayOfWeek::Saturday && c.member_casual == RiderCategory::Casual)
    );
}

#[tokio::test]
async fn test_pipeline_over_zip_archives() {
    let dir = tempfile::tempdir().expect("tempdir");
    let january = dir.path().join("202401-divvy-tripdata.zip");
    let february = dir.path().join("202402-divvy-tripdata.zip");

    write_zip(&january, "202401-divvy-tripdata.csv", SAMPLE);
    write_zip(
        &february,
        "202402-divvy-tripdata.csv",
        "ride_id,started_at,ended_at,member_casual\n\
         FEB1,2024-02-14 18:00:00,2024-02-14 18:25:00,member\n\
         FEB2,2024-02-14 18:00:00,2024-02-14 18:09:00,casual\n",
    );

    let sources = vec![
        Source::from_location(january.to_str().unwrap()),
        Source::from_location(february.to_str().unwrap()),
    ];
    let raw = ingest_all(&BasicClient::new().expect("client"), &sources)
        .await
        .expect("ingest archives");
    assert_eq!(raw.len(), 9);
    assert_eq!(raw[7].ride_id, "FEB1");

    let cleaned = clean(raw);
    assert_eq!(cleaned.report.retained, 6);

    let summary = summarize(&cleaned.trips);
    let feb_member = summary
        .mean_duration_by_month
        .iter()
        .find(|m| m.group == MonthName::Feb && m.member_casual == RiderCategory::Member)
        .expect("february member group");
    assert_eq!(feb_member.mean_duration, 25.0);

    // reading stages copies of the archives; the originals are untouched
    assert!(january.exists());
    assert!(february.exists());
}

#[tokio::test]
async fn test_missing_column_aborts_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let good = dir.path().join("202401.csv");
    let bad = dir.path().join("202402.csv");
    std::fs::write(&good, SAMPLE).unwrap();
    std::fs::write(
        &bad,
        "ride_id,started_at,ended_at\nX,2024-02-01 10:00:00,2024-02-01 10:10:00\n",
    )
    .unwrap();

    let sources = vec![
        Source::from_location(good.to_str().unwrap()),
        Source::from_location(bad.to_str().unwrap()),
    ];
    let err = ingest_all(&BasicClient::new().expect("client"), &sources)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::MissingColumn { ref column, .. } if column == "member_casual"
    ));
}
