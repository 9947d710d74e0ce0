//! GEoREST induced seismicity database parser.
//!
//! Parses the catalog published by CSIC:
//!   https://digital.csic.es/bitstream/10261/284662/3/GEoREST_induced_seismicity_database_v20.11.2022.csv
//!
//! The file is CSV encoded as ISO-8859-1. Columns are located by header name,
//! so extra columns and reordering are tolerated. Fields used:
//!
//! - `date`: event date (required)
//! - `latitude`, `longitude`: WGS84 degrees (required columns, cells may be blank)
//! - `magnitude`
//! - `seism_depth_max`: maximum reported depth
//! - `country`, `location`: free text
//!
//! Rows whose date cannot be parsed are skipped and counted in the
//! `LoadReport`; blank numeric cells become `None`.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};
use std::collections::HashMap;

use crate::config::Encoding;
use crate::model::{Event, EventStore, IngestError};

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

const DATE_COLUMNS: &[&str] = &["date", "event_date"];
const LATITUDE_COLUMNS: &[&str] = &["latitude", "lat"];
const LONGITUDE_COLUMNS: &[&str] = &["longitude", "lon", "long"];
const MAGNITUDE_COLUMNS: &[&str] = &["magnitude", "mag"];
const DEPTH_COLUMNS: &[&str] = &["seism_depth_max", "depth"];
const COUNTRY_COLUMNS: &[&str] = &["country"];
const LOCATION_COLUMNS: &[&str] = &["location", "site"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"];

/// Column indices resolved from the header row
#[derive(Debug)]
struct Columns {
    date: usize,
    latitude: usize,
    longitude: usize,
    magnitude: Option<usize>,
    depth: Option<usize>,
    country: Option<usize>,
    location: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, IngestError> {
        let col_map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.trim_start_matches('\u{feff}').trim().to_lowercase(), idx))
            .collect();

        let find = |aliases: &[&str]| aliases.iter().find_map(|a| col_map.get(*a).copied());

        Ok(Self {
            date: find(DATE_COLUMNS).ok_or(IngestError::MissingColumn("date"))?,
            latitude: find(LATITUDE_COLUMNS).ok_or(IngestError::MissingColumn("latitude"))?,
            longitude: find(LONGITUDE_COLUMNS).ok_or(IngestError::MissingColumn("longitude"))?,
            magnitude: find(MAGNITUDE_COLUMNS),
            depth: find(DEPTH_COLUMNS),
            country: find(COUNTRY_COLUMNS),
            location: find(LOCATION_COLUMNS),
        })
    }
}

/// Row accounting for one catalog load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Data rows read (header excluded)
    pub rows: usize,
    pub loaded: usize,
    pub skipped_bad_date: usize,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes raw catalog bytes into text.
///
/// Latin-1 maps every byte to the code point of the same value, so it
/// never fails. UTF-8 replaces invalid sequences.
pub fn decode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Guesses the field delimiter from the header line: `;` when it appears
/// more often than `,`, otherwise `,`.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Parses catalog text into an `EventStore`.
///
/// # Errors
/// - `IngestError::MissingColumn`: header lacks date, latitude or longitude.
/// - `IngestError::Csv`: malformed CSV (e.g. unterminated quote).
pub fn parse_catalog(text: &str) -> Result<(EventStore, LoadReport), IngestError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(sniff_delimiter(text))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let columns = Columns::from_headers(reader.headers()?)?;

    let mut report = LoadReport::default();
    let mut events = Vec::new();

    for record in reader.records() {
        let record = record?;
        report.rows += 1;

        let Some(date) = record.get(columns.date).and_then(parse_date) else {
            report.skipped_bad_date += 1;
            continue;
        };

        events.push(Event {
            date,
            latitude: number_at(&record, Some(columns.latitude)),
            longitude: number_at(&record, Some(columns.longitude)),
            magnitude: number_at(&record, columns.magnitude),
            depth: number_at(&record, columns.depth),
            country: text_at(&record, columns.country),
            location: text_at(&record, columns.location),
        });
        report.loaded += 1;
    }

    Ok((EventStore::new(events), report))
}

/// Decodes and parses a downloaded or on-disk catalog, logging the outcome.
pub fn load_from_bytes(bytes: &[u8], encoding: Encoding) -> Result<EventStore, IngestError> {
    let text = decode(bytes, encoding);
    let (store, report) = parse_catalog(&text)?;

    info!("Loaded {} of {} catalog rows", report.loaded, report.rows);
    if report.skipped_bad_date > 0 {
        warn!("Skipped {} rows with a missing or unparseable date", report.skipped_bad_date);
    }

    Ok(store)
}

/// Parses a date cell in any of the accepted layouts
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parses a numeric cell; blank, unparseable and non-finite values are `None`.
/// Accepts a decimal comma as well as a decimal point.
fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    raw.parse::<f64>()
        .or_else(|_| raw.replace(',', ".").parse::<f64>())
        .ok()
        .filter(|v| v.is_finite())
}

fn number_at(record: &StringRecord, idx: Option<usize>) -> Option<f64> {
    idx.and_then(|i| record.get(i)).and_then(parse_number)
}

fn text_at(record: &StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| record.get(i))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
