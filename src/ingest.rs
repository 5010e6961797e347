//! Ingestion: turns per-month source files into one unified table of
//! [`RawTrip`] rows.
//!
//! Each source may be a zip archive of CSV members, a gzip-compressed CSV or a
//! plain CSV. Only the four retained columns are kept; station names, ids and
//! coordinates are never read.

use std::io::{Read, Write};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use flate2::read::MultiGzDecoder;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{PipelineError, Result};
use crate::fetch::{HttpClient, fetch_location};
use crate::sources::Source;
use crate::trip::RawTrip;

/// Columns kept from every source, in [`RawTrip`] field order.
pub const RETAINED_COLUMNS: [&str; 4] = ["ride_id", "started_at", "ended_at", "member_casual"];

const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_ARCHIVE: &[u8] = b"PK\x05\x06";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadFormat {
    Zip,
    Gzip,
    Csv,
}

fn detect_format(location: &str, bytes: &[u8]) -> PayloadFormat {
    if location.ends_with(".zip")
        || bytes.starts_with(ZIP_LOCAL_HEADER)
        || bytes.starts_with(ZIP_EMPTY_ARCHIVE)
    {
        PayloadFormat::Zip
    } else if location.ends_with(".gz") || bytes.starts_with(GZIP_MAGIC) {
        PayloadFormat::Gzip
    } else {
        PayloadFormat::Csv
    }
}

fn column_index(headers: &ByteRecord, column: &str, source_name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| String::from_utf8_lossy(h).trim_start_matches('\u{feff}').trim() == column)
        .ok_or_else(|| PipelineError::MissingColumn {
            source_name: source_name.to_string(),
            column: column.to_string(),
        })
}

/// Reads a delimited table with a header row, keeping only
/// [`RETAINED_COLUMNS`].
///
/// Other columns are neither decoded nor validated. A short row yields empty
/// strings for the retained fields it lacks, and invalid UTF-8 in a retained
/// field is replaced lossily; `clean` rejects and counts such rows.
///
/// # Errors
///
/// Returns [`PipelineError::MissingColumn`] if any retained column is absent
/// from the header, or a CSV error for malformed input.
pub fn read_trips<R: Read>(reader: R, source_name: &str) -> Result<Vec<RawTrip>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.byte_headers()?.clone();
    let [ride_id, started_at, ended_at, member_casual] =
        RETAINED_COLUMNS.map(|column| column_index(&headers, column, source_name));
    let (ride_id, started_at, ended_at, member_casual) =
        (ride_id?, started_at?, ended_at?, member_casual?);

    let field = |record: &ByteRecord, idx: usize| {
        record
            .get(idx)
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .unwrap_or_default()
    };

    let mut trips = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        trips.push(RawTrip {
            ride_id: field(&record, ride_id),
            started_at: field(&record, started_at),
            ended_at: field(&record, ended_at),
            member_casual: field(&record, member_casual),
        });
    }

    debug!(source = source_name, rows = trips.len(), "Table read");
    Ok(trips)
}

fn is_csv_member(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".csv") && !name.starts_with("__MACOSX")
}

/// Reads every CSV member of a zip archive, in archive order.
///
/// The archive is staged in a temporary file under `staging_dir` that is
/// removed when this function returns, on success or failure.
fn read_zip_archive(bytes: &[u8], source: &Source, staging_dir: &Path) -> Result<Vec<RawTrip>> {
    let mut staged = tempfile::Builder::new()
        .prefix("tripdata-")
        .suffix(".zip")
        .tempfile_in(staging_dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;

    let mut archive = ZipArchive::new(staged.reopen()?)?;
    let mut trips = Vec::new();
    let mut csv_members = 0;

    for i in 0..archive.len() {
        let member = archive.by_index(i)?;
        let name = member.name().to_string();
        if !member.is_file() || !is_csv_member(&name) {
            continue;
        }

        csv_members += 1;
        trips.extend(read_trips(member, &format!("{}:{}", source.label, name))?);
    }

    if csv_members == 0 {
        return Err(PipelineError::Retrieval {
            location: source.location.clone(),
            reason: "archive contains no CSV member".to_string(),
        });
    }

    debug!(source = %source.label, path = %staged.path().display(), "Releasing staged archive");
    Ok(trips)
}

/// Decodes one source payload into raw rows, staging archives in the system
/// temporary directory.
pub fn read_payload(bytes: &[u8], source: &Source) -> Result<Vec<RawTrip>> {
    read_payload_in(bytes, source, &std::env::temp_dir())
}

/// Decodes one source payload into raw rows, staging archives in
/// `staging_dir`.
pub fn read_payload_in(bytes: &[u8], source: &Source, staging_dir: &Path) -> Result<Vec<RawTrip>> {
    match detect_format(&source.location, bytes) {
        PayloadFormat::Zip => read_zip_archive(bytes, source, staging_dir),
        PayloadFormat::Gzip => read_trips(MultiGzDecoder::new(bytes), &source.label),
        PayloadFormat::Csv => read_trips(bytes, &source.label),
    }
}

/// Retrieves and decodes a single source.
#[tracing::instrument(skip(client, source), fields(source = %source.label))]
pub async fn load_source<C: HttpClient>(client: &C, source: &Source) -> Result<Vec<RawTrip>> {
    let bytes = fetch_location(client, &source.location)
        .await
        .map_err(|e| PipelineError::Retrieval {
            location: source.location.clone(),
            reason: format!("{e:#}"),
        })?;

    let trips = read_payload(&bytes, source)?;
    info!(rows = trips.len(), "Source ingested");
    Ok(trips)
}

/// Loads every source in order and concatenates the rows into one table.
///
/// Any failure aborts the whole ingestion; there is no partial result.
pub async fn ingest_all<C: HttpClient>(client: &C, sources: &[Source]) -> Result<Vec<RawTrip>> {
    let mut unified = Vec::new();

    for source in sources {
        let batch = load_source(client, source).await?;
        unified.extend(batch);
    }

    info!(
        sources = sources.len(),
        rows = unified.len(),
        "Ingestion complete"
    );
    Ok(unified)
}
