use crate::types::period::{Month, Year};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One of the four date-selection modes the dashboard offers.
///
/// Range bounds are inclusive on both ends and compare against the calendar
/// date of each record's timestamp, so a `DateRange` ending on a given day
/// includes every observation of that day.
///
/// # Examples
///
/// ```
/// use windlog::{FilterSpec, Year};
/// use chrono::NaiveDate;
///
/// let june_first = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
/// let one_day = FilterSpec::SingleDay(june_first);
/// let full_year = FilterSpec::Year(Year(2023));
///
/// let noon = june_first.and_hms_opt(12, 0, 0).unwrap();
/// assert!(one_day.matches(noon));
/// assert!(full_year.matches(noon));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FilterSpec {
    /// All records with `start <= date(timestamp) <= end`.
    DateRange { start: NaiveDate, end: NaiveDate },
    /// All records on exactly this calendar day.
    SingleDay(NaiveDate),
    /// All records within one calendar month.
    Month(Month),
    /// All records within one calendar year.
    Year(Year),
}

impl FilterSpec {
    /// Whether a timestamp falls inside the interval this spec implies.
    pub fn matches(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        match self {
            FilterSpec::DateRange { start, end } => date >= *start && date <= *end,
            FilterSpec::SingleDay(day) => date == *day,
            FilterSpec::Month(month) => {
                date.year() == month.year() && date.month() == month.month()
            }
            FilterSpec::Year(year) => date.year() == year.get(),
        }
    }
}
