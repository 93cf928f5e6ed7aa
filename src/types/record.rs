use chrono::NaiveDateTime;
use serde::Serialize;

/// A single normalized observation from the station log.
///
/// Numeric fields are `None` when the source cell was empty or unparseable;
/// they are never coerced to zero. `direction_degrees` is guaranteed to lie
/// in `[0, 360)` when present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindRecord {
    pub timestamp: NaiveDateTime,
    pub speed: Option<f64>,
    pub gust: Option<f64>,
    pub direction_degrees: Option<f64>,
}

impl WindRecord {
    /// Returns the requested magnitude series value for this record.
    pub fn magnitude(&self, field: MagnitudeField) -> Option<f64> {
        match field {
            MagnitudeField::Speed => self.speed,
            MagnitudeField::Gust => self.gust,
        }
    }
}

/// Selects which magnitude series an aggregation reads.
///
/// The wind rose is built twice per filtered set, once per variant, with the
/// same direction values but independent sample gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MagnitudeField {
    Speed,
    Gust,
}
