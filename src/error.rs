use crate::ingest::error::IngestError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindlogError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution,
}
