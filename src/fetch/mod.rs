//! Byte retrieval for source locations.
//!
//! Locations starting with `http` go through an [`HttpClient`]; anything else
//! is read from the local filesystem.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::debug;

/// Downloads `url`, failing on any non-success HTTP status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Bytes> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?)
}

/// Loads a source location from a local path or over HTTP.
#[tracing::instrument(skip(client))]
pub async fn fetch_location<C: HttpClient>(client: &C, location: &str) -> Result<Bytes> {
    let bytes = if location.starts_with("http") {
        fetch_bytes(client, location).await?
    } else {
        let data = std::fs::read(location).with_context(|| format!("reading {location}"))?;
        Bytes::from(data)
    };
    debug!(bytes = bytes.len(), "Source bytes loaded");
    Ok(bytes)
}
