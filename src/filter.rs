//! Date-based selection over the canonical record set, plus the selector
//! inventory (years and months actually present in the data) the dashboard
//! needs to avoid offering empty-by-construction choices.

use crate::types::filter_spec::FilterSpec;
use crate::types::period::Year;
use crate::types::record::WindRecord;
use chrono::Datelike;

/// Returns the records whose timestamp falls inside the selection. Bounds
/// are inclusive on both ends; an empty result is a normal terminal state.
pub fn filter_records(records: &[WindRecord], spec: &FilterSpec) -> Vec<WindRecord> {
    records
        .iter()
        .copied()
        .filter(|r| spec.matches(r.timestamp))
        .collect()
}

/// Distinct years present in the record set, ascending.
pub fn available_years(records: &[WindRecord]) -> Vec<Year> {
    let mut years: Vec<Year> = records
        .iter()
        .map(|r| Year(r.timestamp.date().year()))
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Distinct months (1-12) present in the record set for one year, ascending.
pub fn available_months(records: &[WindRecord], year: Year) -> Vec<u32> {
    let mut months: Vec<u32> = records
        .iter()
        .filter(|r| r.timestamp.date().year() == year.get())
        .map(|r| r.timestamp.date().month())
        .collect();
    months.sort_unstable();
    months.dedup();
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::period::Month;
    use chrono::NaiveDate;

    fn record_at(y: i32, m: u32, d: u32, h: u32) -> WindRecord {
        WindRecord {
            timestamp: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
            speed: None,
            gust: None,
            direction_degrees: None,
        }
    }

    fn sample() -> Vec<WindRecord> {
        vec![
            record_at(2022, 12, 31, 23),
            record_at(2023, 1, 1, 0),
            record_at(2023, 1, 1, 12),
            record_at(2023, 1, 2, 0),
            record_at(2023, 3, 15, 6),
            record_at(2024, 7, 1, 9),
        ]
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let records = sample();
        let spec = FilterSpec::DateRange {
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
        };
        let filtered = filter_records(&records, &spec);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|r| spec.matches(r.timestamp)));
        // The day before the start is excluded even though it is adjacent.
        assert!(filtered
            .iter()
            .all(|r| r.timestamp.date() >= NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()));
    }

    #[test]
    fn single_day_matches_whole_day_only() {
        let records = sample();
        let spec = FilterSpec::SingleDay(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        let filtered = filter_records(&records, &spec);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn month_filter_matches_year_and_month() {
        let records = sample();
        let filtered = filter_records(&records, &FilterSpec::Month(Month::new(2023, 1)));
        assert_eq!(filtered.len(), 3);
        // Same month of a different year stays out.
        let other_year = filter_records(&records, &FilterSpec::Month(Month::new(2022, 1)));
        assert!(other_year.is_empty());
    }

    #[test]
    fn year_filter_matches_calendar_year() {
        let records = sample();
        assert_eq!(filter_records(&records, &FilterSpec::Year(Year(2023))).len(), 4);
        assert_eq!(filter_records(&records, &FilterSpec::Year(Year(2024))).len(), 1);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let records = sample();
        let spec = FilterSpec::SingleDay(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
        assert!(filter_records(&records, &spec).is_empty());
    }

    #[test]
    fn inventory_reflects_data_not_calendar() {
        let records = sample();
        assert_eq!(
            available_years(&records),
            vec![Year(2022), Year(2023), Year(2024)]
        );
        assert_eq!(available_months(&records, Year(2023)), vec![1, 3]);
        assert_eq!(available_months(&records, Year(2024)), vec![7]);
        assert!(available_months(&records, Year(2021)).is_empty());
    }
}
