//! Shared data types for the seismicity service.
//!
//! Everything that crosses a module boundary lives here: the `Event` record
//! produced by ingest, the `Region` table consumed by the rate estimator,
//! and the error enums each layer reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A single seismic event from the catalog.
///
/// Coordinates, magnitude and depth are optional because the published
/// catalog leaves them blank for some rows. An event without coordinates
/// never falls inside any bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub date: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub magnitude: Option<f64>,
    /// Maximum reported depth (`seism_depth_max` in the catalog).
    pub depth: Option<f64>,
    pub country: String,
    pub location: String,
}

impl Event {
    /// Returns `(latitude, longitude)` when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Read-only, ordered collection of events for one analysis session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Events that carry both latitude and longitude.
    pub fn located(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.coordinates().is_some())
    }
}

impl From<Vec<Event>> for EventStore {
    fn from(events: Vec<Event>) -> Self {
        Self::new(events)
    }
}

impl<'a> IntoIterator for &'a EventStore {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// Rectangular latitude/longitude box. All four edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub latitude_min: f64,
    pub latitude_max: f64,
    pub longitude_min: f64,
    pub longitude_max: f64,
}

impl BoundingBox {
    /// True when `(lat, lon)` lies on or inside the box.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.latitude_min
            && lat <= self.latitude_max
            && lon >= self.longitude_min
            && lon <= self.longitude_max
    }

    /// True when the event has coordinates and they lie in the box.
    pub fn contains_event(&self, event: &Event) -> bool {
        event
            .coordinates()
            .is_some_and(|(lat, lon)| self.contains(lat, lon))
    }

    /// Closed polygon ring in GeoJSON `[lon, lat]` order, counter-clockwise.
    pub fn ring(&self) -> [[f64; 2]; 5] {
        [
            [self.longitude_min, self.latitude_min],
            [self.longitude_max, self.latitude_min],
            [self.longitude_max, self.latitude_max],
            [self.longitude_min, self.latitude_max],
            [self.longitude_min, self.latitude_min],
        ]
    }

    /// Finite bounds with `min <= max` on both axes.
    pub fn is_well_formed(&self) -> bool {
        let finite = [
            self.latitude_min,
            self.latitude_max,
            self.longitude_min,
            self.longitude_max,
        ]
        .iter()
        .all(|v| v.is_finite());

        finite && self.latitude_min <= self.latitude_max && self.longitude_min <= self.longitude_max
    }
}

/// A named region with a bounding box and an optional boundary file
/// (GeoJSON path) used only by the map exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub bounds: BoundingBox,
    pub boundary_reference: Option<String>,
}

impl Region {
    /// Builds a region, rejecting inverted or non-finite bounds.
    pub fn new(
        name: impl Into<String>,
        bounds: BoundingBox,
        boundary_reference: Option<String>,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        if !bounds.is_well_formed() {
            return Err(CatalogError::InvalidBounds { name, bounds });
        }
        Ok(Self {
            name,
            bounds,
            boundary_reference,
        })
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures of a rate query. All are input-validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    #[error("region '{0}' not found in region catalog")]
    UnknownRegion(String),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("degenerate window: {events} event(s) on {date} with a zero-day duration")]
    DegenerateWindow { date: NaiveDate, events: usize },
}

/// Failures while building or loading the region table.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("region '{name}' has invalid bounds {bounds:?}")]
    InvalidBounds { name: String, bounds: BoundingBox },

    #[error("region '{0}' is defined more than once")]
    DuplicateRegion(String),
}

/// Failures while loading the event catalog.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog server returned status {0}")]
    Status(u16),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' not found in catalog header")]
    MissingColumn(&'static str),
}

/// Failures while writing map and chart exports.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoJSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while loading `seismon.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
