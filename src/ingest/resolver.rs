//! Maps the source table's headers onto the four canonical column roles.
//!
//! Station feeds name their columns inconsistently: the spreadsheet export
//! carries human headers like `Wind Speed(km/h)`, while the published sheet
//! sometimes degrades to bare positional codes (`Y`, `Z`, `AA`). Each role
//! therefore has an alias table consulted in priority order: exact canonical
//! name, then substring aliases, then an exact positional-code fallback.

use crate::ingest::error::IngestError;

/// The four logical columns every feed must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Timestamp,
    Speed,
    Gust,
    Direction,
}

impl ColumnRole {
    const ALL: [ColumnRole; 4] = [
        ColumnRole::Timestamp,
        ColumnRole::Speed,
        ColumnRole::Gust,
        ColumnRole::Direction,
    ];

    /// The canonical header name, matched exactly with top priority. Also
    /// the name used when reporting this role as missing.
    pub fn canonical_name(self) -> &'static str {
        match self {
            ColumnRole::Timestamp => "timestamp",
            ColumnRole::Speed => "wind_speed",
            ColumnRole::Gust => "wind_gust",
            ColumnRole::Direction => "wind_direction",
        }
    }

    /// Substrings that identify this role in a human-readable header.
    fn substring_aliases(self) -> &'static [&'static str] {
        match self {
            ColumnRole::Timestamp => &["Fecha", "Date", "Time"],
            ColumnRole::Speed => &["Wind Speed"],
            ColumnRole::Gust => &["Wind Gust"],
            ColumnRole::Direction => &["Wind Direction"],
        }
    }

    /// Positional column code some published sheets emit instead of a header.
    fn positional_code(self) -> Option<&'static str> {
        match self {
            ColumnRole::Timestamp => None,
            ColumnRole::Speed => Some("Y"),
            ColumnRole::Gust => Some("Z"),
            ColumnRole::Direction => Some("AA"),
        }
    }

    fn resolve(self, headers: &[String]) -> Option<String> {
        if let Some(exact) = headers.iter().find(|h| *h == self.canonical_name()) {
            return Some(exact.clone());
        }
        if let Some(by_alias) = headers
            .iter()
            .find(|h| self.substring_aliases().iter().any(|a| h.contains(a)))
        {
            return Some(by_alias.clone());
        }
        if let Some(code) = self.positional_code() {
            if let Some(by_code) = headers.iter().find(|h| *h == code) {
                return Some(by_code.clone());
            }
        }
        // The timestamp is conventionally the leading column when nothing
        // names it explicitly.
        if self == ColumnRole::Timestamp {
            return headers.first().cloned();
        }
        None
    }
}

/// Source header names resolved for each canonical role.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumns {
    pub timestamp: String,
    pub speed: String,
    pub gust: String,
    pub direction: String,
}

/// Resolves raw headers to the canonical schema.
///
/// Headers are trimmed before matching. Fails with
/// [`IngestError::MissingColumns`] naming every unresolvable role together
/// with the full set of available headers.
pub fn resolve_columns(headers: &[&str]) -> Result<ResolvedColumns, IngestError> {
    let trimmed: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    let resolved: Vec<Option<String>> = ColumnRole::ALL
        .iter()
        .map(|role| role.resolve(&trimmed))
        .collect();

    match (&resolved[0], &resolved[1], &resolved[2], &resolved[3]) {
        (Some(timestamp), Some(speed), Some(gust), Some(direction)) => Ok(ResolvedColumns {
            timestamp: timestamp.clone(),
            speed: speed.clone(),
            gust: gust.clone(),
            direction: direction.clone(),
        }),
        _ => {
            let missing = ColumnRole::ALL
                .iter()
                .zip(&resolved)
                .filter(|(_, found)| found.is_none())
                .map(|(role, _)| role.canonical_name().to_string())
                .collect();
            Err(IngestError::MissingColumns {
                missing,
                available: trimmed,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_spreadsheet_export_headers() {
        let headers = [
            "Date",
            "Wind Speed(km/h)",
            "Wind Gust(km/h)",
            "Wind Direction(º)",
        ];
        let resolved = resolve_columns(&headers).unwrap();
        assert_eq!(resolved.timestamp, "Date");
        assert_eq!(resolved.speed, "Wind Speed(km/h)");
        assert_eq!(resolved.gust, "Wind Gust(km/h)");
        assert_eq!(resolved.direction, "Wind Direction(º)");
    }

    #[test]
    fn resolves_positional_codes() {
        let headers = ["Fecha", "Y", "Z", "AA"];
        let resolved = resolve_columns(&headers).unwrap();
        assert_eq!(resolved.timestamp, "Fecha");
        assert_eq!(resolved.speed, "Y");
        assert_eq!(resolved.gust, "Z");
        assert_eq!(resolved.direction, "AA");
    }

    #[test]
    fn exact_canonical_name_beats_aliases() {
        let headers = ["timestamp", "wind_speed", "wind_gust", "wind_direction"];
        let resolved = resolve_columns(&headers).unwrap();
        assert_eq!(resolved.speed, "wind_speed");
    }

    #[test]
    fn timestamp_falls_back_to_first_column() {
        let headers = ["Hora local", "Wind Speed", "Wind Gust", "Wind Direction"];
        let resolved = resolve_columns(&headers).unwrap();
        assert_eq!(resolved.timestamp, "Hora local");
    }

    #[test]
    fn missing_gust_is_reported_with_available_headers() {
        let headers = ["Date", "Wind Speed(km/h)", "Wind Direction(º)"];
        let err = resolve_columns(&headers).unwrap_err();
        match err {
            IngestError::MissingColumns { missing, available } => {
                assert_eq!(missing, vec!["wind_gust".to_string()]);
                assert_eq!(available.len(), 3);
                assert!(available.contains(&"Wind Speed(km/h)".to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn headers_are_trimmed_before_matching() {
        let headers = ["  Fecha ", " Wind Speed(km/h)", "Wind Gust(km/h) ", "AA"];
        let resolved = resolve_columns(&headers).unwrap();
        assert_eq!(resolved.direction, "AA");
        assert_eq!(resolved.timestamp, "Fecha");
    }

    #[test]
    fn empty_header_set_reports_every_role() {
        let err = resolve_columns(&[]).unwrap_err();
        match err {
            IngestError::MissingColumns { missing, .. } => {
                assert_eq!(missing.len(), 4);
                assert!(missing.contains(&"timestamp".to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }
}
