//! HTTP endpoint for querying the loaded catalog
//!
//! Provides a small JSON API so notebooks and web maps can ask for rates
//! and layers without reloading the catalog themselves.
//!
//! Endpoints:
//! - GET /health - Service health check
//! - GET /regions - Region table
//! - GET /rate?region=..&start=YYYY-MM-DD&end=YYYY-MM-DD - Event rate
//! - GET /summary - Magnitude statistics, country counts, alerts
//! - GET /country/{name} - Marker layer (GeoJSON) for one country

use chrono::NaiveDate;
use log::{error, info, warn};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::Cursor;

use crate::analysis::groupings::events_in_country;
use crate::analysis::rate::RateEstimator;
use crate::analysis::summarize;
use crate::config::AnalysisConfig;
use crate::model::{EventStore, RateError};
use crate::regions::RegionCatalog;
use crate::render::geojson;

/// Tables and settings the endpoint answers from. Loaded once at startup.
#[derive(Debug)]
pub struct ServiceState {
    pub events: EventStore,
    pub regions: RegionCatalog,
    pub analysis: AnalysisConfig,
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Maps a request URL (path plus optional query) to a status code and JSON
/// body. Kept free of any server type so it can be tested directly.
pub fn route(url: &str, state: &ServiceState) -> (u16, Value) {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let params = parse_query(query);

    match path {
        "/health" => handle_health(state),
        "/regions" => handle_regions(state),
        "/rate" => handle_rate(&params, state),
        "/summary" => (200, json!(summarize(&state.events, state.analysis.alert_magnitude))),
        _ if path.starts_with("/country/") => {
            let name = decode(path.trim_start_matches("/country/"));
            handle_country(&name, state)
        }
        _ => (
            404,
            json!({
                "error": "Not found",
                "available_endpoints": ["/health", "/regions", "/rate", "/summary", "/country/{name}"]
            }),
        ),
    }
}

/// Splits `a=1&b=2` into a map, URL-decoding keys and values.
fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(k), decode(v))
        })
        .collect()
}

/// Form-style decoding: `+` is a space, then percent escapes.
fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

fn bad_request(message: String) -> (u16, Value) {
    (400, json!({ "error": message }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_health(state: &ServiceState) -> (u16, Value) {
    (
        200,
        json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "events": state.events.len(),
            "regions": state.regions.len(),
        }),
    )
}

fn handle_regions(state: &ServiceState) -> (u16, Value) {
    (200, json!({ "regions": state.regions.regions() }))
}

fn handle_rate(params: &HashMap<String, String>, state: &ServiceState) -> (u16, Value) {
    let Some(region) = params.get("region") else {
        return bad_request("missing query parameter 'region'".to_string());
    };
    let start = match date_param(params, "start") {
        Ok(d) => d,
        Err(msg) => return bad_request(msg),
    };
    let end = match date_param(params, "end") {
        Ok(d) => d,
        Err(msg) => return bad_request(msg),
    };

    let estimator = RateEstimator::new(&state.events, &state.regions)
        .with_policy(state.analysis.degenerate_window);

    match estimator.estimate_detailed(region, start, end) {
        Ok(estimate) => (200, json!(estimate)),
        Err(e @ RateError::UnknownRegion(_)) => (404, json!({ "error": e.to_string() })),
        Err(e) => bad_request(e.to_string()),
    }
}

fn date_param(params: &HashMap<String, String>, key: &str) -> Result<NaiveDate, String> {
    let raw = params
        .get(key)
        .ok_or_else(|| format!("missing query parameter '{key}'"))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("invalid {key} date '{raw}' (expected YYYY-MM-DD): {e}"))
}

fn handle_country(name: &str, state: &ServiceState) -> (u16, Value) {
    let events = events_in_country(&state.events, name);
    if events.is_empty() {
        return (
            404,
            json!({ "error": format!("no located events found for country '{}'", name.trim()) }),
        );
    }
    (200, geojson::markers(events))
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port. Blocks forever.
pub fn start_endpoint_server(port: u16, state: ServiceState) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    info!("HTTP endpoint listening on http://0.0.0.0:{}", port);

    for request in server.incoming_requests() {
        let (status, body) = if *request.method() == tiny_http::Method::Get {
            route(request.url(), &state)
        } else {
            (405, json!({ "error": "Only GET is supported" }))
        };

        if status >= 400 {
            warn!("{} {} -> {}", request.method(), request.url(), status);
        }

        if let Err(e) = request.respond(create_response(status, &body)) {
            error!("Failed to send response: {}", e);
        }
    }

    Ok(())
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: &Value) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let body = serde_json::to_vec_pretty(json).unwrap_or_else(|_| b"{}".to_vec());
    let response = tiny_http::Response::from_data(body).with_status_code(status_code);

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
