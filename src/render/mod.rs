//! Presentation exports: GeoJSON map layers and CSV chart tables.
//!
//! Submodules:
//! - `geojson`: heat, marker and region layers.
//! - `series`: timeline, country histogram and depth scatter tables.
//!
//! `export_all` writes the full set into one directory.

pub mod geojson;
pub mod series;

use log::info;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::analysis::groupings::count_by_country;
use crate::analysis::trends::summarize_magnitudes;
use crate::model::{EventStore, ExportError};
use crate::regions::RegionCatalog;

pub const HEATMAP_FILE: &str = "heatmap.geojson";
pub const RISK_MAP_FILE: &str = "risk_map.geojson";
pub const TIMELINE_FILE: &str = "timeline.csv";
pub const COUNTRY_HISTOGRAM_FILE: &str = "country_histogram.csv";
pub const DEPTH_SCATTER_FILE: &str = "depth_scatter.csv";

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Writes a GeoJSON value, pretty-printed.
pub fn write_geojson(path: &Path, value: &Value) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// File name for a country's marker map, e.g. `markers_united_states.geojson`.
pub fn marker_file_name(country: &str) -> String {
    let slug: String = country
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("markers_{slug}.geojson")
}

/// Writes every map layer and chart table into `dir`, creating it if
/// needed. Returns the paths written.
pub fn export_all(
    dir: &Path,
    store: &EventStore,
    catalog: &RegionCatalog,
    heat_radius: u32,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut written = Vec::new();

    let path = dir.join(HEATMAP_FILE);
    write_geojson(&path, &geojson::heatmap(store, heat_radius))?;
    written.push(path);

    let path = dir.join(RISK_MAP_FILE);
    write_geojson(&path, &geojson::risk_map(store, catalog, heat_radius))?;
    written.push(path);

    let summary = summarize_magnitudes(store);
    let path = dir.join(TIMELINE_FILE);
    let rows = series::write_timeline(create(&path)?, store, summary.as_ref())?;
    info!("{}: {} rows", path.display(), rows);
    written.push(path);

    let path = dir.join(COUNTRY_HISTOGRAM_FILE);
    series::write_country_histogram(create(&path)?, &count_by_country(store))?;
    written.push(path);

    let path = dir.join(DEPTH_SCATTER_FILE);
    series::write_depth_scatter(create(&path)?, store)?;
    written.push(path);

    Ok(written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
