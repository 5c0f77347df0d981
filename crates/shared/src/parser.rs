//! Tracking CSV reader.
//!
//! Expected header: `TagId,Name,DateTime,UTMx,UTMy`, optionally preceded by an
//! index column. Columns are matched by header name so extra columns are fine.
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::models::TrackPoint;
use crate::utm::{self, UtmZone};

/// `MM/DD/YYYY HH:MM`, as exported by the tag receivers.
pub const DATETIME_FORMAT: &str = "%m/%d/%Y %H:%M";

/// Rows need at least tag, name, datetime and both coordinates.
pub const MIN_FIELDS: usize = 5;

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "TagId")]
    tag_id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "DateTime")]
    date_time: String,
    #[serde(rename = "UTMx")]
    utm_x: f64,
    #[serde(rename = "UTMy")]
    utm_y: f64,
}

/// Why a single row was left out.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("line {line}: expected at least 5 fields, found {found}")]
    TooFewFields { line: u64, found: usize },
    #[error("line {line}: {source}")]
    Malformed { line: u64, source: csv::Error },
    #[error("line {line}: empty tag id")]
    MissingTag { line: u64 },
    #[error("line {line}: invalid datetime {value:?}")]
    InvalidDateTime { line: u64, value: String },
    #[error("line {line}: coordinates ({x}, {y}) do not convert to a finite position")]
    InvalidCoordinates { line: u64, x: f64, y: f64 },
}

impl RowError {
    pub fn line(&self) -> u64 {
        match self {
            RowError::TooFewFields { line, .. }
            | RowError::Malformed { line, .. }
            | RowError::MissingTag { line }
            | RowError::InvalidDateTime { line, .. }
            | RowError::InvalidCoordinates { line, .. } => *line,
        }
    }
}

/// The whole document could not be read (bad header, I/O).
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("cannot read CSV header: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Default)]
pub struct ParsedTracks {
    pub points: Vec<TrackPoint>,
    pub rejected: Vec<RowError>,
}

pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), DATETIME_FORMAT).ok()
}

pub fn format_datetime(timestamp: &NaiveDateTime) -> String {
    timestamp.format(DATETIME_FORMAT).to_string()
}

/// Parse tracking CSV text, converting positions from `zone`.
///
/// Bad rows are logged and collected in [`ParsedTracks::rejected`]; they never
/// stop the rows after them.
pub fn parse_tracks(text: &str, zone: UtmZone) -> Result<ParsedTracks, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut parsed = ParsedTracks::default();
    for result in reader.records() {
        let outcome = match result {
            Ok(record) => parse_row(&record, &headers, zone),
            Err(e) => Err(RowError::Malformed {
                line: e.position().map(|p| p.line()).unwrap_or_default(),
                source: e,
            }),
        };
        match outcome {
            Ok(point) => parsed.points.push(point),
            Err(err) => {
                tracing::warn!(line = err.line(), "skipping row: {err}");
                parsed.rejected.push(err);
            }
        }
    }

    tracing::debug!(
        points = parsed.points.len(),
        rejected = parsed.rejected.len(),
        "parsed tracks"
    );
    Ok(parsed)
}

fn parse_row(
    record: &csv::StringRecord,
    headers: &csv::StringRecord,
    zone: UtmZone,
) -> Result<TrackPoint, RowError> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    if record.len() < MIN_FIELDS {
        return Err(RowError::TooFewFields {
            line,
            found: record.len(),
        });
    }

    let raw: RawRow = record
        .deserialize(Some(headers))
        .map_err(|source| RowError::Malformed { line, source })?;
    if raw.tag_id.is_empty() {
        return Err(RowError::MissingTag { line });
    }
    let timestamp = parse_datetime(&raw.date_time).ok_or_else(|| RowError::InvalidDateTime {
        line,
        value: raw.date_time.clone(),
    })?;
    let position = utm::to_lat_lng(raw.utm_x, raw.utm_y, zone).ok_or(
        RowError::InvalidCoordinates {
            line,
            x: raw.utm_x,
            y: raw.utm_y,
        },
    )?;

    Ok(TrackPoint {
        tag_id: raw.tag_id,
        name: raw.name,
        timestamp,
        latitude: position.latitude,
        longitude: position.longitude,
    })
}
