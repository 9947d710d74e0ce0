//! Data ingestion for the seismicity service.
//!
//! The rest of the crate never fetches data itself: it receives an
//! `EventSource` and a `RegionSource` and asks them for tables.
//!
//! Submodules:
//! - `georest`: GEoREST CSV decoding and parsing.
//! - `fixtures` (test only): representative catalog rows.

pub mod fixtures;
pub mod georest;

use log::info;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{DataConfig, Encoding};
use crate::model::{CatalogError, EventStore, IngestError, Region};
use crate::regions::RegionCatalog;

// ---------------------------------------------------------------------------
// Source traits
// ---------------------------------------------------------------------------

/// Anything that can produce the event table.
pub trait EventSource {
    fn load_events(&self) -> Result<EventStore, IngestError>;
}

/// Anything that can produce the region table.
pub trait RegionSource {
    fn load_regions(&self) -> Result<RegionCatalog, CatalogError>;
}

/// An already-materialized store is its own source.
impl EventSource for EventStore {
    fn load_events(&self) -> Result<EventStore, IngestError> {
        Ok(self.clone())
    }
}

impl RegionSource for Vec<Region> {
    fn load_regions(&self) -> Result<RegionCatalog, CatalogError> {
        RegionCatalog::new(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Catalog sources
// ---------------------------------------------------------------------------

/// Downloads the catalog over HTTP with a blocking client.
#[derive(Debug, Clone)]
pub struct RemoteCsvSource {
    url: String,
    encoding: Encoding,
    timeout: Duration,
}

impl RemoteCsvSource {
    pub fn new(url: impl Into<String>, encoding: Encoding, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            encoding,
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EventSource for RemoteCsvSource {
    fn load_events(&self) -> Result<EventStore, IngestError> {
        info!("Fetching seismicity catalog from {}", self.url);

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client.get(&self.url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status(status.as_u16()));
        }

        let bytes = response.bytes()?;
        info!("Downloaded {} bytes", bytes.len());
        georest::load_from_bytes(&bytes, self.encoding)
    }
}

/// Reads the catalog from a local file.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
    encoding: Encoding,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>, encoding: Encoding) -> Self {
        Self {
            path: path.into(),
            encoding,
        }
    }
}

impl EventSource for CsvFileSource {
    fn load_events(&self) -> Result<EventStore, IngestError> {
        info!("Reading seismicity catalog from {}", self.path.display());

        let bytes = fs::read(&self.path).map_err(|source| IngestError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        georest::load_from_bytes(&bytes, self.encoding)
    }
}

/// Picks the catalog source described by the `[data]` settings: the local
/// path when one is configured, the remote URL otherwise.
pub fn source_from_config(config: &DataConfig) -> Box<dyn EventSource> {
    match &config.path {
        Some(path) => Box::new(CsvFileSource::new(path.clone(), config.encoding)),
        None => Box::new(RemoteCsvSource::new(
            config.url.clone(),
            config.encoding,
            Duration::from_secs(config.timeout_secs),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;
    use fixtures::fixture_georest_latin1_bytes;
    use std::io::Write;

    #[test]
    fn test_csv_file_source_reads_latin1_catalog() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&fixture_georest_latin1_bytes()).expect("write fixture");

        let source = CsvFileSource::new(file.path(), Encoding::Latin1);
        let store = source.load_events().expect("catalog should load");
        assert_eq!(store.len(), 7);
    }

    #[test]
    fn test_csv_file_source_missing_file() {
        let source = CsvFileSource::new("no/such/catalog.csv", Encoding::Latin1);
        let err = source.load_events().unwrap_err();
        assert!(matches!(err, IngestError::Io { ref path, .. } if path.contains("catalog.csv")));
    }

    #[test]
    fn test_in_memory_sources() {
        let store = EventStore::default();
        assert!(store.load_events().expect("clone").is_empty());

        let regions = vec![
            Region::new(
                "Region A",
                BoundingBox {
                    latitude_min: 0.0,
                    latitude_max: 10.0,
                    longitude_min: 0.0,
                    longitude_max: 10.0,
                },
                None,
            )
            .expect("valid region"),
        ];
        let catalog = regions.load_regions().expect("catalog should build");
        assert!(catalog.contains("Region A"));
    }

    #[test]
    fn test_source_from_config_prefers_local_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&fixture_georest_latin1_bytes()).expect("write fixture");

        let config = DataConfig {
            url: "http://127.0.0.1:9/unreachable.csv".to_string(),
            path: Some(file.path().to_path_buf()),
            ..DataConfig::default()
        };
        let store = source_from_config(&config)
            .load_events()
            .expect("local path should be used, not the URL");
        assert_eq!(store.len(), 7);
    }
}
