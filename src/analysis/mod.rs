//! Data analysis for the seismicity service.
//!
//! Submodules:
//! - `rate`: event-rate estimate for a region and date window.
//! - `trends`: magnitude statistics and alert selection.
//! - `groupings`: per-country counts, country lookup, map center.
//!
//! `summarize` bundles the descriptive pieces into one serializable report
//! for the CLI `summary` command and the `/summary` endpoint.

pub mod groupings;
pub mod rate;
pub mod trends;

use serde::Serialize;

use crate::model::{Event, EventStore};
use groupings::{count_by_country, ranked_countries};
use trends::{DepthSummary, MagnitudeSummary, alerts, summarize_depths, summarize_magnitudes};

/// Descriptive overview of a loaded catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub events: usize,
    pub located: usize,
    pub magnitude: Option<MagnitudeSummary>,
    pub depth: Option<DepthSummary>,
    /// `(country, events)`, most active first
    pub countries: Vec<(String, usize)>,
    pub alert_magnitude: f64,
    pub alerts: Vec<Event>,
}

pub fn summarize(store: &EventStore, alert_magnitude: f64) -> CatalogSummary {
    let counts = count_by_country(store);
    let countries = ranked_countries(&counts)
        .into_iter()
        .map(|(name, n)| (name.to_string(), n))
        .collect();

    CatalogSummary {
        events: store.len(),
        located: store.located().count(),
        magnitude: summarize_magnitudes(store),
        depth: summarize_depths(store),
        countries,
        alert_magnitude,
        alerts: alerts(store, alert_magnitude).into_iter().cloned().collect(),
    }
}
