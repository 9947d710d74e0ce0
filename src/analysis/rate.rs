//! Event-rate estimation for a region and date window.
//!
//! The estimate is the number of catalog events inside
//! the region's bounding box and the date window, divided by the window
//! length in days. Both the box and the window are inclusive on every edge.
//!
//! ```text
//! rate = count(events in box ∩ [start, end]) / (end - start).days
//! ```
//!
//! A window with no matching events yields exactly `0.0`. A zero-length
//! window (`start == end`) with matching events is resolved by
//! `DegenerateWindowPolicy`.

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::{EventStore, RateError, Region};
use crate::regions::RegionCatalog;

/// Behavior when `start == end` and at least one event matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateWindowPolicy {
    /// Treat the single day as a one-day window: rate = event count.
    #[default]
    CountAsOneDay,
    /// Fail with `RateError::DegenerateWindow`.
    Reject,
}

/// Full result of a rate query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateEstimate {
    pub region: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_events: usize,
    pub duration_days: i64,
    pub events_per_day: f64,
}

/// Computes event rates over a read-only event store and region catalog.
///
/// Holds only shared borrows, so one estimator can serve any number of
/// queries (and threads) while the underlying tables stay untouched.
#[derive(Debug, Clone, Copy)]
pub struct RateEstimator<'a> {
    events: &'a EventStore,
    regions: &'a RegionCatalog,
    policy: DegenerateWindowPolicy,
}

impl<'a> RateEstimator<'a> {
    pub fn new(events: &'a EventStore, regions: &'a RegionCatalog) -> Self {
        Self {
            events,
            regions,
            policy: DegenerateWindowPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DegenerateWindowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DegenerateWindowPolicy {
        self.policy
    }

    /// Events per day for `region_name` over `[start, end]`.
    pub fn estimate(
        &self,
        region_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, RateError> {
        self.estimate_detailed(region_name, start, end)
            .map(|e| e.events_per_day)
    }

    /// Same as `estimate`, also reporting the count and window length.
    pub fn estimate_detailed(
        &self,
        region_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RateEstimate, RateError> {
        let region = self.resolve(region_name, start, end)?;
        let total_events = count_in_window(self.events, region, start, end);
        let duration_days = end.signed_duration_since(start).num_days();

        let events_per_day = if total_events == 0 {
            0.0
        } else if duration_days == 0 {
            match self.policy {
                DegenerateWindowPolicy::CountAsOneDay => total_events as f64,
                DegenerateWindowPolicy::Reject => {
                    return Err(RateError::DegenerateWindow {
                        date: start,
                        events: total_events,
                    });
                }
            }
        } else {
            total_events as f64 / duration_days as f64
        };

        debug!(
            "rate {}: {} events over {} days ({} to {}) = {:.6}/day",
            region_name, total_events, duration_days, start, end, events_per_day
        );

        Ok(RateEstimate {
            region: region.name.clone(),
            start,
            end,
            total_events,
            duration_days,
            events_per_day,
        })
    }

    /// Number of events in the region's box and the window, without the
    /// rate division.
    pub fn count_events(
        &self,
        region_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<usize, RateError> {
        let region = self.resolve(region_name, start, end)?;
        Ok(count_in_window(self.events, region, start, end))
    }

    /// Looks the region up, then checks the window. Nothing is filtered
    /// until both pass.
    fn resolve(
        &self,
        region_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<&'a Region, RateError> {
        let region = self
            .regions
            .get(region_name)
            .ok_or_else(|| RateError::UnknownRegion(region_name.to_string()))?;

        if start > end {
            return Err(RateError::InvalidRange { start, end });
        }

        Ok(region)
    }
}

/// Counts events inside `region`'s box with `start <= date <= end`.
fn count_in_window(
    events: &EventStore,
    region: &Region,
    start: NaiveDate,
    end: NaiveDate,
) -> usize {
    events
        .iter()
        .filter(|e| e.date >= start && e.date <= end)
        .filter(|e| region.bounds.contains_event(e))
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Event};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(lat: f64, lon: f64, on: NaiveDate) -> Event {
        Event {
            date: on,
            latitude: Some(lat),
            longitude: Some(lon),
            magnitude: Some(2.5),
            depth: Some(3.0),
            country: "Spain".to_string(),
            location: "Test".to_string(),
        }
    }

    fn region_a_catalog() -> RegionCatalog {
        let region = Region::new(
            "Region A",
            BoundingBox {
                latitude_min: 0.0,
                latitude_max: 10.0,
                longitude_min: 0.0,
                longitude_max: 10.0,
            },
            None,
        )
        .unwrap();
        RegionCatalog::new(vec![region]).unwrap()
    }

    fn reference_store() -> EventStore {
        EventStore::new(vec![
            event(5.0, 5.0, date(2023, 3, 1)),
            event(5.0, 5.0, date(2023, 6, 1)),
            event(50.0, 50.0, date(2023, 4, 1)),
        ])
    }

    // --- Reference scenarios --------------------------------------------------

    #[test]
    fn test_full_year_window_excludes_out_of_box_event() {
        let store = reference_store();
        let catalog = region_a_catalog();
        let estimator = RateEstimator::new(&store, &catalog);

        let result = estimator
            .estimate_detailed("Region A", date(2023, 1, 1), date(2023, 12, 31))
            .expect("query should succeed");

        assert_eq!(result.total_events, 2, "third event is outside the box");
        assert_eq!(result.duration_days, 364);
        assert!((result.events_per_day - 2.0 / 364.0).abs() < 1e-12);
        assert!((result.events_per_day - 0.00549).abs() < 1e-5);
    }

    #[test]
    fn test_single_day_window_counts_as_one_day_by_default() {
        let store = EventStore::new(vec![event(5.0, 5.0, date(2023, 1, 1))]);
        let catalog = region_a_catalog();
        let estimator = RateEstimator::new(&store, &catalog);

        let rate = estimator
            .estimate("Region A", date(2023, 1, 1), date(2023, 1, 1))
            .expect("default policy should not fail");
        assert_eq!(rate, 1.0);
    }

    #[test]
    fn test_single_day_window_rejected_under_reject_policy() {
        let store = EventStore::new(vec![event(5.0, 5.0, date(2023, 1, 1))]);
        let catalog = region_a_catalog();
        let estimator =
            RateEstimator::new(&store, &catalog).with_policy(DegenerateWindowPolicy::Reject);

        let err = estimator
            .estimate("Region A", date(2023, 1, 1), date(2023, 1, 1))
            .unwrap_err();
        assert_eq!(
            err,
            RateError::DegenerateWindow {
                date: date(2023, 1, 1),
                events: 1
            }
        );
    }

    #[test]
    fn test_single_day_window_without_events_is_zero_under_either_policy() {
        let store = reference_store();
        let catalog = region_a_catalog();
        for policy in [DegenerateWindowPolicy::CountAsOneDay, DegenerateWindowPolicy::Reject] {
            let estimator = RateEstimator::new(&store, &catalog).with_policy(policy);
            let rate = estimator
                .estimate("Region A", date(2023, 2, 2), date(2023, 2, 2))
                .expect("empty result is not an error");
            assert_eq!(rate, 0.0);
        }
    }

    #[test]
    fn test_unknown_region_is_lookup_error() {
        let store = reference_store();
        let catalog = region_a_catalog();
        let estimator = RateEstimator::new(&store, &catalog);

        let err = estimator
            .estimate("Region Z", date(2023, 1, 1), date(2023, 12, 31))
            .unwrap_err();
        assert_eq!(err, RateError::UnknownRegion("Region Z".to_string()));
    }

    #[test]
    fn test_inverted_window_is_invalid_range() {
        let store = reference_store();
        let catalog = region_a_catalog();
        let estimator = RateEstimator::new(&store, &catalog);

        let err = estimator
            .estimate("Region A", date(2023, 12, 31), date(2023, 1, 1))
            .unwrap_err();
        assert!(matches!(err, RateError::InvalidRange { .. }));
    }

    // --- Filter semantics -----------------------------------------------------

    #[test]
    fn test_events_on_every_edge_are_included() {
        let start = date(2023, 1, 1);
        let end = date(2023, 1, 11);
        let store = EventStore::new(vec![
            event(0.0, 5.0, date(2023, 1, 5)),  // lat_min
            event(10.0, 5.0, date(2023, 1, 5)), // lat_max
            event(5.0, 0.0, date(2023, 1, 5)),  // lon_min
            event(5.0, 10.0, date(2023, 1, 5)), // lon_max
            event(5.0, 5.0, start),
            event(5.0, 5.0, end),
        ]);
        let catalog = region_a_catalog();
        let estimator = RateEstimator::new(&store, &catalog);

        let count = estimator.count_events("Region A", start, end).unwrap();
        assert_eq!(count, 6);
    }

    #[test]
    fn test_events_just_outside_window_are_excluded() {
        let store = EventStore::new(vec![
            event(5.0, 5.0, date(2022, 12, 31)),
            event(5.0, 5.0, date(2024, 1, 1)),
        ]);
        let catalog = region_a_catalog();
        let estimator = RateEstimator::new(&store, &catalog);

        let rate = estimator
            .estimate("Region A", date(2023, 1, 1), date(2023, 12, 31))
            .unwrap();
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn test_events_missing_coordinates_never_match() {
        let mut no_lat = event(5.0, 5.0, date(2023, 3, 1));
        no_lat.latitude = None;
        let mut no_lon = event(5.0, 5.0, date(2023, 3, 1));
        no_lon.longitude = None;

        let store = EventStore::new(vec![no_lat, no_lon]);
        let catalog = region_a_catalog();
        let estimator = RateEstimator::new(&store, &catalog);

        let count = estimator
            .count_events("Region A", date(2023, 1, 1), date(2023, 12, 31))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_empty_store_returns_zero() {
        let store = EventStore::default();
        let catalog = region_a_catalog();
        let estimator = RateEstimator::new(&store, &catalog);

        let result = estimator
            .estimate_detailed("Region A", date(2000, 1, 1), date(2030, 1, 1))
            .unwrap();
        assert_eq!(result.total_events, 0);
        assert_eq!(result.events_per_day, 0.0);
    }

    #[test]
    fn test_widening_window_never_decreases_count() {
        let store = EventStore::new(vec![
            event(1.0, 1.0, date(2022, 11, 15)),
            event(2.0, 2.0, date(2023, 2, 1)),
            event(3.0, 3.0, date(2023, 5, 20)),
            event(4.0, 4.0, date(2023, 9, 9)),
            event(60.0, 4.0, date(2023, 9, 9)),
            event(5.0, 5.0, date(2024, 3, 3)),
        ]);
        let catalog = region_a_catalog();
        let estimator = RateEstimator::new(&store, &catalog);

        let windows = [
            (date(2023, 5, 1), date(2023, 6, 1)),
            (date(2023, 2, 1), date(2023, 6, 1)),
            (date(2023, 1, 1), date(2023, 12, 31)),
            (date(2022, 1, 1), date(2023, 12, 31)),
            (date(2022, 1, 1), date(2024, 12, 31)),
        ];

        let mut previous = 0;
        for (start, end) in windows {
            let count = estimator.count_events("Region A", start, end).unwrap();
            assert!(count >= previous, "{start}..{end} lost events: {count} < {previous}");
            let rate = estimator.estimate("Region A", start, end).unwrap();
            assert!(rate >= 0.0);
            previous = count;
        }
        assert_eq!(previous, 5);
    }

    #[test]
    fn test_lookup_error_takes_precedence_over_range_error() {
        let store = reference_store();
        let catalog = region_a_catalog();
        let estimator = RateEstimator::new(&store, &catalog);

        let err = estimator
            .estimate("Region Z", date(2023, 12, 31), date(2023, 1, 1))
            .unwrap_err();
        assert!(matches!(err, RateError::UnknownRegion(_)));
    }

    #[test]
    fn test_policy_deserializes_from_snake_case() {
        let policy: DegenerateWindowPolicy =
            serde_json::from_str("\"count_as_one_day\"").expect("should deserialize");
        assert_eq!(policy, DegenerateWindowPolicy::CountAsOneDay);
        let policy: DegenerateWindowPolicy =
            serde_json::from_str("\"reject\"").expect("should deserialize");
        assert_eq!(policy, DegenerateWindowPolicy::Reject);
    }

    #[test]
    fn test_estimator_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RateEstimator<'static>>();
    }
}
