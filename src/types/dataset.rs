use crate::filter::{available_months, available_years, filter_records};
use crate::ingest::normalize::ParseDiagnostics;
use crate::types::data_source::DataSource;
use crate::types::filter_spec::FilterSpec;
use crate::types::period::Year;
use crate::types::record::WindRecord;
use chrono::NaiveDate;
use std::sync::Arc;

/// One ingested station log: the canonical record set plus the parse
/// diagnostics of the run that produced it.
///
/// The record set is immutable for the lifetime of the ingestion and shared
/// cheaply between clones; every filter change recomputes its outputs from
/// this set rather than mutating it.
///
/// Instances are obtained from [`crate::Windlog::dataset`].
#[derive(Debug, Clone)]
pub struct WindDataset {
    source: DataSource,
    records: Arc<[WindRecord]>,
    diagnostics: ParseDiagnostics,
}

impl WindDataset {
    pub(crate) fn new(
        source: DataSource,
        records: Vec<WindRecord>,
        diagnostics: ParseDiagnostics,
    ) -> Self {
        Self {
            source,
            records: records.into(),
            diagnostics,
        }
    }

    /// The canonical record set, sorted ascending by timestamp.
    pub fn records(&self) -> &[WindRecord] {
        &self.records
    }

    /// Identity of the table this dataset was ingested from.
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Counters for cells and rows the normalizer could not parse.
    ///
    /// Zeroed when the dataset was rehydrated from the parquet cache, since
    /// invalid rows were already discarded when the cache was written.
    pub fn diagnostics(&self) -> &ParseDiagnostics {
        &self.diagnostics
    }

    /// Records whose timestamp falls inside the given selection.
    ///
    /// An empty result is a normal terminal state, not an error.
    pub fn filter(&self, spec: &FilterSpec) -> Vec<WindRecord> {
        filter_records(&self.records, spec)
    }

    /// Years actually present in the data, for populating a year selector.
    pub fn available_years(&self) -> Vec<Year> {
        available_years(&self.records)
    }

    /// Months (1-12) present in the data for the given year.
    pub fn available_months(&self, year: Year) -> Vec<u32> {
        available_months(&self.records, year)
    }

    /// Earliest and latest calendar dates in the set, for bounding a date
    /// picker. `None` when the dataset is empty.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.timestamp.date();
        let last = self.records.last()?.timestamp.date();
        Some((first, last))
    }
}
