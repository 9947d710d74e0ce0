//! seismon_service: induced seismicity catalog analysis.
//!
//! Loads the GEoREST induced seismicity database and a table of regions of
//! interest, estimates event rates per region and date window, and exports
//! map layers and chart tables.
//!
//! # Module structure
//!
//! ```text
//! seismon_service
//! ├── model       - shared data types (Event, EventStore, Region, errors)
//! ├── config      - regions.toml and seismon.toml loaders
//! ├── regions     - RegionCatalog, validated region lookup by name
//! ├── ingest
//! │   ├── georest - GEoREST CSV decoding and parsing
//! │   └── fixtures (test only) - representative catalog rows
//! ├── analysis
//! │   ├── rate      - RateEstimator, events per day in a box and window
//! │   ├── trends    - magnitude statistics and alerts
//! │   └── groupings - per-country counts, country lookup, map center
//! ├── render
//! │   ├── geojson - heat, marker and region map layers
//! │   └── series  - timeline, histogram and scatter CSV tables
//! └── endpoint    - JSON HTTP API over the loaded catalog
//! ```

pub mod analysis;
pub mod config;
pub mod endpoint;
pub mod ingest;
pub mod model;
pub mod regions;
pub mod render;
