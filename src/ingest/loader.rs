use crate::ingest::error::IngestError;
use crate::ingest::normalize::{normalize_frame, ParseDiagnostics};
use crate::ingest::resolver::resolve_columns;
use crate::types::data_source::{DataSource, CACHE_FILE_PREFIX};
use crate::types::record::WindRecord;
use chrono::DateTime;
use log::{info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::{fs, task};

/// Loads a station log from its source and produces the canonical record
/// set. Handles the on-disk parquet cache: a fresh cache entry short-circuits
/// the fetch entirely, a stale or missing one triggers a full
/// fetch-resolve-normalize pass whose result is cached for next time.
pub struct WindDataLoader {
    cache_dir: PathBuf,
    download_client: Client,
    fetch_timeout: Duration,
}

impl WindDataLoader {
    pub fn new(cache_dir: &Path, fetch_timeout: Duration) -> WindDataLoader {
        WindDataLoader {
            cache_dir: cache_dir.to_path_buf(),
            download_client: Client::new(),
            fetch_timeout,
        }
    }

    /// Loads the canonical record set for a source, honoring a maximum cache
    /// age. Returns the records together with the parse diagnostics of the
    /// run; rehydrating from the parquet cache yields zeroed diagnostics.
    pub async fn load(
        &self,
        source: &DataSource,
        max_age: Duration,
    ) -> Result<(Vec<WindRecord>, ParseDiagnostics), IngestError> {
        let parquet_path = self.cache_dir.join(source.cache_file_name());

        if self.cache_is_fresh(&parquet_path, max_age).await? {
            info!("cache hit for {} at {:?}", source, parquet_path);
            let records = Self::records_from_parquet(&parquet_path)?;
            return Ok((records, ParseDiagnostics::default()));
        }
        warn!("cache miss for {}; fetching and normalizing", source);

        let raw_bytes = match source {
            DataSource::Url(url) => self.download(url).await?,
            DataSource::File(path) => fs::read(path)
                .await
                .map_err(|e| IngestError::SourceRead(path.clone(), e))?,
        };

        let separator = sniff_separator(&raw_bytes);
        let source_id = source.to_string();
        let mut df = Self::csv_to_dataframe(raw_bytes, separator, &source_id).await?;

        // Published sheets pad header cells with stray whitespace; matching
        // and later column lookups both want the trimmed names.
        let trimmed: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        df.set_column_names(trimmed.iter().map(|s| s.as_str()))?;

        let headers: Vec<&str> = trimmed.iter().map(|s| s.as_str()).collect();
        let columns = resolve_columns(&headers)?;
        let (records, diagnostics) = normalize_frame(&df, &columns)?;

        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| IngestError::CacheDirCreation(self.cache_dir.clone(), e))?;
        Self::cache_dataframe(canonical_frame(&records)?, &parquet_path).await?;
        info!("cached canonical records for {} to {:?}", source, parquet_path);

        Ok((records, diagnostics))
    }

    /// Removes the parquet cache entry for one source, if present.
    pub async fn delete_cache_entry(&self, source: &DataSource) -> Result<(), IngestError> {
        let path = self.cache_dir.join(source.cache_file_name());
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("deleted cache entry for {} at {:?}", source, path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IngestError::CacheDeletion(path, e)),
        }
    }

    /// Removes every parquet cache entry this crate has written.
    pub async fn clear_cache_dir(&self) -> Result<(), IngestError> {
        let mut entries = match fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(IngestError::CacheMetadataRead(self.cache_dir.clone(), e)),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| IngestError::CacheMetadataRead(self.cache_dir.clone(), e))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(CACHE_FILE_PREFIX) && name.ends_with(".parquet") {
                fs::remove_file(entry.path())
                    .await
                    .map_err(|e| IngestError::CacheDeletion(entry.path(), e))?;
            }
        }
        Ok(())
    }

    /// A cache file counts as fresh when it exists and its mtime is within
    /// `max_age`.
    async fn cache_is_fresh(&self, path: &Path, max_age: Duration) -> Result<bool, IngestError> {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(IngestError::CacheMetadataRead(path.to_path_buf(), e)),
        };
        let modified = metadata
            .modified()
            .map_err(|e| IngestError::CacheMetadataRead(path.to_path_buf(), e))?;
        let age = modified
            .elapsed()
            .map_err(|e| IngestError::SystemTimeCalculation(path.to_path_buf(), e))?;
        if age > max_age {
            warn!("cache entry {:?} is stale ({:?} old)", path, age);
            return Ok(false);
        }
        Ok(true)
    }

    /// Downloads the published table with a bounded per-request timeout.
    async fn download(&self, url: &str) -> Result<Vec<u8>, IngestError> {
        info!("downloading wind log from {}", url);

        let response = self
            .download_client
            .get(url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IngestError::RequestTimeout(url.to_string(), e)
                } else {
                    IngestError::NetworkRequest(url.to_string(), e)
                }
            })?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    IngestError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    IngestError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                IngestError::RequestTimeout(url.to_string(), e)
            } else {
                IngestError::BodyRead(url.to_string(), e)
            }
        })?;
        info!("downloaded {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }

    /// Parses raw delimited bytes (header row included) into an all-string
    /// DataFrame using a blocking task. Schema inference is disabled so the
    /// normalizer sees the raw cell text.
    async fn csv_to_dataframe(
        bytes: Vec<u8>,
        separator: u8,
        source_id: &str,
    ) -> Result<DataFrame, IngestError> {
        let source_id = source_id.to_string();

        task::spawn_blocking(move || {
            let mut temp_file = NamedTempFile::new().map_err(|e| IngestError::CsvReadIo {
                source_id: source_id.clone(),
                source: e,
            })?;
            temp_file
                .write_all(&bytes)
                .map_err(|e| IngestError::CsvReadIo {
                    source_id: source_id.clone(),
                    source: e,
                })?;
            temp_file.flush().map_err(|e| IngestError::CsvReadIo {
                source_id: source_id.clone(),
                source: e,
            })?;

            let df = CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(Some(0))
                .with_parse_options(CsvParseOptions::default().with_separator(separator))
                .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
                .map_err(|e| IngestError::CsvReadPolars {
                    source_id: source_id.clone(),
                    source: e,
                })?
                .finish()
                .map_err(|e| IngestError::CsvReadPolars {
                    source_id: source_id.clone(),
                    source: e,
                })?;

            Ok(df)
        })
        .await?
    }

    /// Writes the canonical frame to a parquet file using spawn_blocking.
    async fn cache_dataframe(mut df: DataFrame, path: &Path) -> Result<(), IngestError> {
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || {
            let file = std::fs::File::create(&path_buf)
                .map_err(|e| IngestError::ParquetWriteIo(path_buf.clone(), e))?;
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)
                .map_err(|e| IngestError::ParquetWritePolars(path_buf, e))?;
            Ok::<(), IngestError>(())
        })
        .await??;
        Ok(())
    }

    /// Rehydrates the canonical record set from a parquet cache entry.
    fn records_from_parquet(path: &Path) -> Result<Vec<WindRecord>, IngestError> {
        let df = LazyFrame::scan_parquet(path, Default::default())
            .map_err(|e| IngestError::ParquetScan(path.to_path_buf(), e))?
            .collect()
            .map_err(|e| IngestError::ParquetScan(path.to_path_buf(), e))?;

        let get = |name: &str| {
            df.column(name)
                .map_err(|e| IngestError::ColumnNotFound(name.to_string(), e))
        };
        let timestamps = get("timestamp")?
            .datetime()
            .map_err(|e| IngestError::ColumnNotFound("timestamp".to_string(), e))?;
        let speeds = get("wspd")?
            .f64()
            .map_err(|e| IngestError::ColumnNotFound("wspd".to_string(), e))?;
        let gusts = get("wpgt")?
            .f64()
            .map_err(|e| IngestError::ColumnNotFound("wpgt".to_string(), e))?;
        let directions = get("wdir")?
            .f64()
            .map_err(|e| IngestError::ColumnNotFound("wdir".to_string(), e))?;

        let mut records = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let Some(timestamp) = timestamps
                .get(idx)
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.naive_utc())
            else {
                continue;
            };
            records.push(WindRecord {
                timestamp,
                speed: speeds.get(idx),
                gust: gusts.get(idx),
                direction_degrees: directions.get(idx),
            });
        }
        Ok(records)
    }
}

/// Picks the field separator by comparing delimiter counts on the header
/// line: published sheets alternate between comma and semicolon exports.
fn sniff_separator(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or(bytes);
    let semicolons = header.iter().filter(|b| **b == b';').count();
    let commas = header.iter().filter(|b| **b == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Builds the typed canonical frame that gets cached as parquet.
fn canonical_frame(records: &[WindRecord]) -> Result<DataFrame, PolarsError> {
    let timestamps: Column = DatetimeChunked::from_naive_datetime(
        "timestamp".into(),
        records.iter().map(|r| r.timestamp),
        TimeUnit::Milliseconds,
    )
    .into_series()
    .into();
    let speeds: Column =
        Float64Chunked::from_iter_options("wspd".into(), records.iter().map(|r| r.speed))
            .into_series()
            .into();
    let gusts: Column =
        Float64Chunked::from_iter_options("wpgt".into(), records.iter().map(|r| r.gust))
            .into_series()
            .into();
    let directions: Column = Float64Chunked::from_iter_options(
        "wdir".into(),
        records.iter().map(|r| r.direction_degrees),
    )
    .into_series()
    .into();

    DataFrame::new(vec![timestamps, speeds, gusts, directions])
}
