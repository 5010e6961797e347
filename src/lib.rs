pub mod analyzers;
pub mod clean;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod output;
pub mod sources;
pub mod trip;
