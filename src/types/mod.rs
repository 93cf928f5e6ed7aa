pub mod data_source;
pub mod dataset;
pub mod filter_spec;
pub mod period;
pub mod record;
