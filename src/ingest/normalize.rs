//! Coerces raw cells into typed values and assembles the canonical record
//! set.
//!
//! The published sheet is locale-hostile: decimal commas, non-breaking
//! spaces, unit suffixes, and free-text placeholders like `n/a` all appear in
//! numeric columns. Cells that survive cleaning parse as `f64`; anything else
//! becomes an absent value, never zero. Rows whose timestamp cannot be parsed
//! are dropped entirely, since the timestamp is the join key for all
//! downstream filtering.

use crate::ingest::error::IngestError;
use crate::ingest::resolver::ResolvedColumns;
use crate::types::record::WindRecord;
use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use polars::prelude::DataFrame;
use serde::Serialize;

/// Timestamp layouts observed across feed variants. Date-only layouts parse
/// to midnight.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Counts of rows and cells the normalizer could not parse.
///
/// Parse-level issues never abort the pipeline; these counters exist so a
/// caller can surface data-quality diagnostics. Empty cells are plain
/// absence and are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostics {
    /// Data rows seen in the source table.
    pub rows_scanned: usize,
    /// Rows dropped because their timestamp cell did not parse.
    pub rows_dropped_bad_timestamp: usize,
    /// Non-empty speed cells that did not survive numeric cleaning.
    pub invalid_speed_cells: usize,
    /// Non-empty gust cells that did not survive numeric cleaning.
    pub invalid_gust_cells: usize,
    /// Non-empty direction cells that were unparseable or outside `[0, 360)`.
    pub invalid_direction_cells: usize,
}

impl ParseDiagnostics {
    pub fn has_issues(&self) -> bool {
        self.rows_dropped_bad_timestamp > 0
            || self.invalid_speed_cells > 0
            || self.invalid_gust_cells > 0
            || self.invalid_direction_cells > 0
    }
}

/// Parses a timestamp cell, trying each known layout in order.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Cleans and parses a numeric cell.
///
/// Strips non-breaking spaces, turns a decimal comma into a point, drops
/// every remaining character outside `[0-9.\-]`, then parses as `f64`.
/// `"12,5"` becomes `12.5`; `"n/a"` becomes `None`.
pub fn normalize_numeric(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .replace('\u{a0}', "")
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse::<f64>().ok()
}

/// Parses a direction cell as a plain float and validates the compass range.
/// Out-of-range or unparseable values are absent.
pub fn normalize_direction(raw: &str) -> Option<f64> {
    let degrees = raw.trim().parse::<f64>().ok()?;
    if (0.0..360.0).contains(&degrees) {
        Some(degrees)
    } else {
        None
    }
}

/// Builds the canonical record set from an all-string DataFrame and the
/// resolved column mapping.
///
/// The output is sorted ascending by timestamp. Returns the records together
/// with the parse diagnostics of this run.
pub fn normalize_frame(
    df: &DataFrame,
    columns: &ResolvedColumns,
) -> Result<(Vec<WindRecord>, ParseDiagnostics), IngestError> {
    let get_str = |name: &str| {
        df.column(name)
            .map_err(|e| IngestError::ColumnNotFound(name.to_string(), e))?
            .str()
            .map_err(|e| IngestError::ColumnNotFound(name.to_string(), e))
            .cloned()
    };

    let timestamps = get_str(&columns.timestamp)?;
    let speeds = get_str(&columns.speed)?;
    let gusts = get_str(&columns.gust)?;
    let directions = get_str(&columns.direction)?;

    let mut diagnostics = ParseDiagnostics {
        rows_scanned: df.height(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(df.height());

    for idx in 0..df.height() {
        let Some(timestamp) = timestamps.get(idx).and_then(parse_timestamp) else {
            // Counts genuinely bad cells; a fully blank row still lacks the
            // join key and is dropped either way.
            diagnostics.rows_dropped_bad_timestamp += 1;
            continue;
        };

        let speed = parse_cell(speeds.get(idx), normalize_numeric, &mut diagnostics.invalid_speed_cells);
        let gust = parse_cell(gusts.get(idx), normalize_numeric, &mut diagnostics.invalid_gust_cells);
        let direction_degrees = parse_cell(
            directions.get(idx),
            normalize_direction,
            &mut diagnostics.invalid_direction_cells,
        );

        records.push(WindRecord {
            timestamp,
            speed,
            gust,
            direction_degrees,
        });
    }

    records.sort_by_key(|r| r.timestamp);

    if diagnostics.has_issues() {
        warn!(
            "normalization issues: {} rows dropped (bad timestamp), invalid cells: speed={} gust={} direction={}",
            diagnostics.rows_dropped_bad_timestamp,
            diagnostics.invalid_speed_cells,
            diagnostics.invalid_gust_cells,
            diagnostics.invalid_direction_cells,
        );
    }

    Ok((records, diagnostics))
}

fn parse_cell(
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<f64>,
    invalid_counter: &mut usize,
) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let value = parse(raw);
    if value.is_none() {
        *invalid_counter += 1;
    }
    value
}
