//! Magnitude trend statistics and alert selection.
//!
//! `summarize_magnitudes` produces the mean and standard deviation used for
//! the timeline band (mean ± one standard deviation). `alerts` picks out the
//! events at or above the configured alert magnitude. `summarize_depths`
//! reports the depth range alongside.

use serde::Serialize;

use crate::model::{Event, EventStore};

/// Descriptive statistics over the events that carry a magnitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagnitudeSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); 0 for a single value
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl MagnitudeSummary {
    /// Lower and upper edge of the mean ± one standard deviation band
    pub fn band(&self) -> (f64, f64) {
        (self.mean - self.std_dev, self.mean + self.std_dev)
    }
}

/// Summarizes event magnitudes. Returns `None` when no event has one.
pub fn summarize_magnitudes(store: &EventStore) -> Option<MagnitudeSummary> {
    let values: Vec<f64> = store
        .iter()
        .filter_map(|e| e.magnitude)
        .filter(|m| m.is_finite())
        .collect();

    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;

    let std_dev = if count > 1 {
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_sq / (count - 1) as f64).sqrt()
    } else {
        0.0
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(MagnitudeSummary {
        count,
        mean,
        std_dev,
        min,
        max,
    })
}

/// Range and mean of the reported maximum depths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthSummary {
    pub count: usize,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

/// Summarizes event depths. Returns `None` when no event has one.
pub fn summarize_depths(store: &EventStore) -> Option<DepthSummary> {
    let values: Vec<f64> = store
        .iter()
        .filter_map(|e| e.depth)
        .filter(|d| d.is_finite())
        .collect();

    if values.is_empty() {
        return None;
    }

    let count = values.len();
    Some(DepthSummary {
        count,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        mean: values.iter().sum::<f64>() / count as f64,
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Events with magnitude `>= threshold`, strongest first.
pub fn alerts(store: &EventStore, threshold: f64) -> Vec<&Event> {
    let mut hits: Vec<&Event> = store
        .iter()
        .filter(|e| e.magnitude.is_some_and(|m| m >= threshold))
        .collect();

    hits.sort_by(|a, b| {
        let ma = a.magnitude.unwrap_or(f64::NEG_INFINITY);
        let mb = b.magnitude.unwrap_or(f64::NEG_INFINITY);
        mb.total_cmp(&ma).then(a.date.cmp(&b.date))
    });
    hits
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
