//! Tabular chart exports (CSV).
//!
//! - `timeline.csv`: magnitude over time with the mean ± std-dev band
//! - `country_histogram.csv`: events per country
//! - `depth_scatter.csv`: country/location against depth

use csv::Writer;
use std::collections::BTreeMap;
use std::io::Write;

use crate::analysis::groupings::ranked_countries;
use crate::analysis::trends::MagnitudeSummary;
use crate::model::EventStore;

/// Writes one row per event with a magnitude, ordered by date.
///
/// The band columns are empty when no summary is supplied. Returns the
/// number of data rows written.
pub fn write_timeline<W: Write>(
    writer: W,
    store: &EventStore,
    summary: Option<&MagnitudeSummary>,
) -> Result<usize, csv::Error> {
    let mut out = Writer::from_writer(writer);
    out.write_record(["date", "magnitude", "mean", "lower", "upper"])?;

    let mut points: Vec<_> = store
        .iter()
        .filter_map(|e| e.magnitude.map(|m| (e.date, m)))
        .collect();
    points.sort_by_key(|(date, _)| *date);

    let band = summary.map(|s| {
        let (lower, upper) = s.band();
        [s.mean.to_string(), lower.to_string(), upper.to_string()]
    });

    for (date, magnitude) in &points {
        let [mean, lower, upper] = band.clone().unwrap_or_default();
        out.write_record([date.to_string(), magnitude.to_string(), mean, lower, upper])?;
    }

    out.flush()?;
    Ok(points.len())
}

/// Writes `country,events`, most active country first.
pub fn write_country_histogram<W: Write>(
    writer: W,
    counts: &BTreeMap<String, usize>,
) -> Result<usize, csv::Error> {
    let mut out = Writer::from_writer(writer);
    out.write_record(["country", "events"])?;

    let ranked = ranked_countries(counts);
    for (country, events) in &ranked {
        out.write_record([country.to_string(), events.to_string()])?;
    }

    out.flush()?;
    Ok(ranked.len())
}

/// Writes `country,location,depth` for every event with a depth.
pub fn write_depth_scatter<W: Write>(writer: W, store: &EventStore) -> Result<usize, csv::Error> {
    let mut out = Writer::from_writer(writer);
    out.write_record(["country", "location", "depth"])?;

    let mut rows = 0;
    for event in store.iter().filter(|e| e.depth.is_some()) {
        let depth = event.depth.map(|d| d.to_string()).unwrap_or_default();
        out.write_record([event.country.as_str(), event.location.as_str(), depth.as_str()])?;
        rows += 1;
    }

    out.flush()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
