//! GeoJSON map layers.
//!
//! Every layer is a plain `FeatureCollection` so any web map (Leaflet,
//! MapLibre, QGIS) can render it:
//!
//! - heat layer: one point per located event, weighted by magnitude
//! - marker layer: one point per event with a depth popup
//! - region layer: each region's bounding box as a polygon, carrying its
//!   event count for choropleth shading
//!
//! Coordinates are written in GeoJSON order, `[longitude, latitude]`.

use serde_json::{Value, json};

use crate::model::{Event, EventStore};
use crate::regions::RegionCatalog;

/// Wraps features in a `FeatureCollection`.
pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn point(lat: f64, lon: f64, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [lon, lat] },
        "properties": properties,
    })
}

/// Heat points for located events. `weight` is the magnitude, or 1 when the
/// catalog has none.
pub fn heat_points<'a, I>(events: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a Event>,
{
    events
        .into_iter()
        .filter_map(|e| {
            let (lat, lon) = e.coordinates()?;
            Some(point(
                lat,
                lon,
                json!({
                    "layer": "heat",
                    "weight": e.magnitude.unwrap_or(1.0),
                    "magnitude": e.magnitude,
                    "date": e.date,
                }),
            ))
        })
        .collect()
}

/// Heat map of all located events, with the suggested radius as a foreign
/// member of the collection.
pub fn heatmap(store: &EventStore, radius: u32) -> Value {
    let mut collection = feature_collection(heat_points(store));
    collection["heat_radius"] = json!(radius);
    collection
}

/// Marker points with a depth popup.
pub fn markers<'a, I>(events: I) -> Value
where
    I: IntoIterator<Item = &'a Event>,
{
    let features = events
        .into_iter()
        .filter_map(|e| {
            let (lat, lon) = e.coordinates()?;
            let popup = match e.depth {
                Some(depth) => format!("Depth: {depth} m"),
                None => "Depth: unknown".to_string(),
            };
            Some(point(
                lat,
                lon,
                json!({
                    "layer": "marker",
                    "popup": popup,
                    "depth": e.depth,
                    "magnitude": e.magnitude,
                    "date": e.date,
                    "country": e.country,
                    "location": e.location,
                }),
            ))
        })
        .collect();

    feature_collection(features)
}

/// Region polygons with the number of located events inside each box.
pub fn region_polygons(store: &EventStore, catalog: &RegionCatalog) -> Vec<Value> {
    catalog
        .regions()
        .iter()
        .map(|region| {
            let event_count = store.iter().filter(|e| region.bounds.contains_event(e)).count();
            json!({
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [region.bounds.ring()] },
                "properties": {
                    "layer": "region",
                    "name": region.name,
                    "event_count": event_count,
                    "boundary_reference": region.boundary_reference,
                },
            })
        })
        .collect()
}

/// Heat layer plus the region layer in one collection.
pub fn risk_map(store: &EventStore, catalog: &RegionCatalog, radius: u32) -> Value {
    let mut features = heat_points(store);
    features.extend(region_polygons(store, catalog));

    let mut collection = feature_collection(features);
    collection["heat_radius"] = json!(radius);
    collection
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
