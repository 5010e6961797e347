//! The monthly trip-data sources the pipeline reads by default.

/// Base URL of the public Divvy trip-data bucket.
pub const TRIPDATA_BASE_URL: &str = "https://divvy-tripdata.s3.amazonaws.com";

/// Year covered by [`default_sources`].
pub const DEFAULT_YEAR: i32 = 2024;

/// One per-month source of trip records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Short name used in logs and errors, e.g. `202401`.
    pub label: String,
    /// URL or local path of a `.zip`, `.csv.gz` or `.csv` file.
    pub location: String,
}

impl Source {
    /// Builds a source from a location given on the command line, labeling
    /// it by file name.
    pub fn from_location(location: &str) -> Self {
        let label = location
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(location)
            .to_string();
        Self {
            label,
            location: location.to_string(),
        }
    }
}

/// Twelve monthly archives for [`DEFAULT_YEAR`], in calendar order.
pub fn default_sources() -> Vec<Source> {
    (1..=12)
        .map(|month| {
            let label = format!("{DEFAULT_YEAR}{month:02}");
            Source {
                location: format!("{TRIPDATA_BASE_URL}/{label}-divvy-tripdata.zip"),
                label,
            }
        })
        .collect()
}
