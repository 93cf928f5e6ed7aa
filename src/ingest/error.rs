use polars::error::PolarsError;
use std::path::PathBuf;
use std::time::SystemTimeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Request timed out for {0}")]
    RequestTimeout(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read body for {0}")]
    BodyRead(String, #[source] reqwest::Error),

    #[error("Failed to read source file '{0}'")]
    SourceRead(PathBuf, #[source] std::io::Error),

    #[error("I/O error processing delimited data from '{source_id}'")]
    CsvReadIo {
        source_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parsing error processing delimited data from '{source_id}'")]
    CsvReadPolars {
        source_id: String,
        #[source]
        source: PolarsError,
    },

    #[error("Required columns {missing:?} could not be resolved; available headers: {available:?}")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Required column '{0}' not found in DataFrame")]
    ColumnNotFound(String, #[source] PolarsError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("I/O error writing parquet cache file '{0}'")]
    ParquetWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing parquet cache file '{0}'")]
    ParquetWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed to scan parquet cache file '{0}'")]
    ParquetScan(PathBuf, #[source] PolarsError),

    #[error("Failed to read metadata for cache file '{0}'")]
    CacheMetadataRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to calculate cache age for '{0}'")]
    SystemTimeCalculation(PathBuf, #[source] SystemTimeError),

    #[error("Failed to delete cache '{0}'")]
    CacheDeletion(PathBuf, #[source] std::io::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}

impl IngestError {
    /// Whether re-invoking ingestion may succeed without any change on the
    /// caller's side (transient fetch failures, as opposed to a schema
    /// mismatch in the source itself).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            IngestError::NetworkRequest(..)
                | IngestError::RequestTimeout(..)
                | IngestError::HttpStatus { .. }
                | IngestError::BodyRead(..)
        )
    }
}
