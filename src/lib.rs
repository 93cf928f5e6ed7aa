mod analysis;
mod error;
mod filter;
mod ingest;
mod types;
mod utils;
mod windlog;

pub use error::WindlogError;
pub use windlog::*;

pub use filter::{available_months, available_years, filter_records};

pub use analysis::rose::{
    aggregate_rose, RoseAggregation, RoseBin, RoseConfig, COMPASS_POINTS_16,
};
pub use analysis::stats::{summarize, SummaryMetrics, UtilityWindow};

pub use ingest::error::IngestError;
pub use ingest::normalize::{
    normalize_direction, normalize_numeric, parse_timestamp, ParseDiagnostics,
};
pub use ingest::resolver::{resolve_columns, ColumnRole, ResolvedColumns};

pub use types::data_source::DataSource;
pub use types::dataset::WindDataset;
pub use types::filter_spec::FilterSpec;
pub use types::period::{Month, Year};
pub use types::record::{MagnitudeField, WindRecord};
