//! Country grouping and data organization utilities.
//!
//! `count_by_country` turns the flat event list into the per-country
//! frequency table behind the country histogram. `events_in_country` answers
//! the country lookup ("show me the events in Spain") and `map_center` gives
//! the point a map view should open on.

use std::collections::BTreeMap;

use crate::model::{Event, EventStore};

/// Label used for rows with an empty country field.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Event count per country, keyed by the country name as written in the
/// catalog. Blank countries are counted under `UNKNOWN_COUNTRY`.
pub fn count_by_country(store: &EventStore) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for event in store {
        let country = event.country.trim();
        let key = if country.is_empty() { UNKNOWN_COUNTRY } else { country };
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }

    counts
}

/// Countries ordered by descending event count, then name.
pub fn ranked_countries(counts: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut ranked: Vec<(&str, usize)> = counts.iter().map(|(k, &v)| (k.as_str(), v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked
}

/// Located events whose country matches `name`, ignoring case and
/// surrounding whitespace.
pub fn events_in_country<'a>(store: &'a EventStore, name: &str) -> Vec<&'a Event> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }

    store
        .located()
        .filter(|e| e.country.trim().to_lowercase() == wanted)
        .collect()
}

/// Mean `(latitude, longitude)` of the given events that have coordinates.
pub fn map_center<'a, I>(events: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a Event>,
{
    let (mut lat_sum, mut lon_sum, mut n) = (0.0, 0.0, 0usize);
    for (lat, lon) in events.into_iter().filter_map(Event::coordinates) {
        lat_sum += lat;
        lon_sum += lon;
        n += 1;
    }

    if n == 0 {
        None
    } else {
        Some((lat_sum / n as f64, lon_sum / n as f64))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{fixtures::fixture_georest_csv, georest::parse_catalog};

    #[test]
    fn test_count_by_country_from_fixture() {
        let (store, _) = parse_catalog(fixture_georest_csv()).expect("fixture should parse");
        let counts = count_by_country(&store);

        assert_eq!(counts.get("Spain"), Some(&3));
        assert_eq!(counts.get("Switzerland"), Some(&2));
        assert_eq!(counts.get("United States"), Some(&1));
        assert_eq!(counts.values().sum::<usize>(), store.len());
    }

    #[test]
    fn test_blank_country_counted_as_unknown() {
        let (store, _) = parse_catalog(fixture_georest_csv()).expect("fixture should parse");
        let counts = count_by_country(&store);
        assert_eq!(counts.get(UNKNOWN_COUNTRY), Some(&1));
    }

    #[test]
    fn test_ranked_countries_descending() {
        let counts = BTreeMap::from([
            ("B".to_string(), 2),
            ("A".to_string(), 2),
            ("C".to_string(), 5),
        ]);
        let ranked = ranked_countries(&counts);
        assert_eq!(ranked, vec![("C", 5), ("A", 2), ("B", 2)]);
    }

    #[test]
    fn test_events_in_country_is_case_insensitive_and_needs_coordinates() {
        let (store, _) = parse_catalog(fixture_georest_csv()).expect("fixture should parse");

        let spain = events_in_country(&store, "  spain ");
        // one Spanish row has no coordinates
        assert_eq!(spain.len(), 2);
        assert!(spain.iter().all(|e| e.coordinates().is_some()));
    }

    #[test]
    fn test_events_in_unknown_country_is_empty() {
        let (store, _) = parse_catalog(fixture_georest_csv()).expect("fixture should parse");
        assert!(events_in_country(&store, "Atlantis").is_empty());
        assert!(events_in_country(&store, "   ").is_empty());
    }

    #[test]
    fn test_map_center_averages_located_events() {
        let (store, _) = parse_catalog(fixture_georest_csv()).expect("fixture should parse");
        let switzerland = events_in_country(&store, "Switzerland");
        let (lat, lon) = map_center(switzerland).expect("Swiss events are located");
        assert!((lat - 47.0).abs() < 1e-9);
        assert!((lon - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_center_none_without_coordinates() {
        assert!(map_center(EventStore::default().iter()).is_none());
    }
}
