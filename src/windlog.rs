//! This module provides the main entry point for ingesting a wind station
//! log. It loads the source table (remote published CSV or local file),
//! normalizes it into the canonical record set, and memoizes the result per
//! source identity with a bounded validity duration.

use crate::error::WindlogError;
use crate::ingest::loader::WindDataLoader;
use crate::types::data_source::DataSource;
use crate::types::dataset::WindDataset;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use log::info;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// How long an ingested dataset stays valid before a re-fetch, unless
/// overridden per client or per request.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Bound on one network fetch of the source table.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

struct CachedDataset {
    dataset: WindDataset,
    loaded_at: Instant,
}

/// The client for ingesting and caching wind station logs.
///
/// Ingestion is the only asynchronous, fallible stage of the pipeline; the
/// [`WindDataset`] it returns feeds the pure filter/summarize/rose functions
/// synchronously. Datasets are cached twice, keyed by source identity: an
/// in-memory map for the session and a parquet copy of the canonical frame
/// on disk, both honoring the configured time-to-live.
///
/// Create an instance with [`Windlog::new()`] for default behavior, or with
/// the [`Windlog::configured()`] builder to control cache location, TTL, and
/// fetch timeout.
///
/// # Examples
///
/// ```no_run
/// # use windlog::{Windlog, DataSource, WindlogError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), WindlogError> {
/// let client = Windlog::new().await?;
/// let dataset = client
///     .dataset()
///     .source(DataSource::Url("https://example.com/station.csv".into()))
///     .call()
///     .await?;
/// println!("{} records", dataset.records().len());
/// # Ok(())
/// # }
/// ```
pub struct Windlog {
    loader: WindDataLoader,
    datasets: Mutex<HashMap<DataSource, CachedDataset>>,
    cache_ttl: Duration,
}

#[bon]
impl Windlog {
    /// Creates a client with explicit configuration.
    ///
    /// # Arguments
    ///
    /// * `.cache_folder(PathBuf)`: Optional. Where parquet cache entries
    ///   live. Defaults to the system cache directory. Created if missing.
    /// * `.cache_ttl(Duration)`: Optional. Validity duration for cached
    ///   datasets, in memory and on disk. Defaults to 600 seconds.
    /// * `.fetch_timeout(Duration)`: Optional. Bound on one network fetch.
    ///   Defaults to 30 seconds.
    ///
    /// # Errors
    ///
    /// Returns [`WindlogError::CacheDirResolution`] if no cache directory
    /// could be determined, or [`WindlogError::CacheDirCreation`] if it
    /// could not be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use windlog::{Windlog, WindlogError};
    /// # use std::path::PathBuf;
    /// # use std::time::Duration;
    /// # async fn run() -> Result<(), WindlogError> {
    /// let client = Windlog::configured()
    ///     .cache_folder(PathBuf::from("/tmp/windlog"))
    ///     .cache_ttl(Duration::from_secs(60))
    ///     .call()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn configured(
        cache_folder: Option<PathBuf>,
        cache_ttl: Option<Duration>,
        fetch_timeout: Option<Duration>,
    ) -> Result<Self, WindlogError> {
        let cache_folder = match cache_folder {
            Some(folder) => folder,
            None => get_cache_dir().ok_or(WindlogError::CacheDirResolution)?,
        };
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| WindlogError::CacheDirCreation(cache_folder.clone(), e))?;
        Ok(Self {
            loader: WindDataLoader::new(
                &cache_folder,
                fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT),
            ),
            datasets: Mutex::new(HashMap::new()),
            cache_ttl: cache_ttl.unwrap_or(DEFAULT_CACHE_TTL),
        })
    }

    /// Creates a client using the default cache directory and durations.
    pub async fn new() -> Result<Self, WindlogError> {
        Self::configured().call().await
    }

    /// Creates a client with a specific cache directory.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, WindlogError> {
        Self::configured().cache_folder(cache_folder).call().await
    }

    /// Ingests (or returns the cached) dataset for a source.
    ///
    /// Checks the in-memory cache first, then the on-disk parquet cache,
    /// then fetches and normalizes the source table. The canonical record
    /// set is immutable once derived; repeated calls within the validity
    /// window share it.
    ///
    /// # Arguments
    ///
    /// * `.source(DataSource)`: **Required.** The table to ingest.
    /// * `.max_age(Duration)`: Optional. Per-request override of the
    ///   client's cache TTL. `Duration::ZERO` forces a re-fetch.
    ///
    /// # Errors
    ///
    /// Returns [`WindlogError::Ingest`] wrapping the fetch, schema, or cache
    /// failure. Schema errors list every missing role and the available
    /// headers; fetch errors are retryable by calling again.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use windlog::{Windlog, DataSource, WindlogError};
    /// # use std::time::Duration;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), WindlogError> {
    /// let client = Windlog::new().await?;
    /// let dataset = client
    ///     .dataset()
    ///     .source(DataSource::File("wind.csv".into()))
    ///     .max_age(Duration::from_secs(60))
    ///     .call()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn dataset(
        &self,
        source: DataSource,
        max_age: Option<Duration>,
    ) -> Result<WindDataset, WindlogError> {
        let max_age = max_age.unwrap_or(self.cache_ttl);

        {
            let cache = self.datasets.lock().await;
            if let Some(entry) = cache.get(&source) {
                if entry.loaded_at.elapsed() <= max_age {
                    info!("in-memory dataset hit for {}", source);
                    return Ok(entry.dataset.clone());
                }
            }
            // Stale or missing; release the lock before the slow load.
        }

        let (records, diagnostics) = self.loader.load(&source, max_age).await?;
        let dataset = WindDataset::new(source.clone(), records, diagnostics);

        let mut cache = self.datasets.lock().await;
        cache.insert(
            source,
            CachedDataset {
                dataset: dataset.clone(),
                loaded_at: Instant::now(),
            },
        );
        Ok(dataset)
    }

    /// Convenience for ingesting a remotely published table.
    pub async fn from_url(&self, url: impl Into<String>) -> Result<WindDataset, WindlogError> {
        self.dataset().source(DataSource::Url(url.into())).call().await
    }

    /// Convenience for ingesting a local file.
    pub async fn from_file(&self, path: impl Into<PathBuf>) -> Result<WindDataset, WindlogError> {
        self.dataset().source(DataSource::File(path.into())).call().await
    }

    /// Drops one source from both cache levels, forcing the next request to
    /// re-fetch.
    pub async fn invalidate(&self, source: &DataSource) -> Result<(), WindlogError> {
        self.datasets.lock().await.remove(source);
        self.loader.delete_cache_entry(source).await?;
        Ok(())
    }

    /// Drops every cached dataset, in memory and on disk.
    pub async fn clear_cache(&self) -> Result<(), WindlogError> {
        self.datasets.lock().await.clear();
        self.loader.clear_cache_dir().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rose::{aggregate_rose, RoseAggregation, RoseConfig};
    use crate::analysis::stats::{summarize, UtilityWindow};
    use crate::types::filter_spec::FilterSpec;
    use crate::types::record::MagnitudeField;
    use chrono::NaiveDate;

    const CSV: &str = "\
Fecha,Wind Speed(km/h),Wind Gust(km/h),Wind Direction(º)
2023-06-01 00:00:00,\"5,0\",\"9,0\",90
2023-06-01 06:00:00,\"10,0\",\"14,0\",90
2023-06-01 12:00:00,\"10,0\",\"16,0\",180
2023-06-01 18:00:00,\"30,0\",\"42,0\",270
2023-06-02 00:00:00,\"12,0\",\"15,0\",45
";

    async fn client_with_csv(dir: &tempfile::TempDir) -> (Windlog, DataSource) {
        let csv_path = dir.path().join("wind.csv");
        std::fs::write(&csv_path, CSV).unwrap();
        let client = Windlog::with_cache_folder(dir.path().to_path_buf())
            .await
            .unwrap();
        (client, DataSource::File(csv_path))
    }

    #[tokio::test]
    async fn end_to_end_single_day() -> Result<(), WindlogError> {
        let dir = tempfile::tempdir().unwrap();
        let (client, source) = client_with_csv(&dir).await;

        let dataset = client.dataset().source(source).call().await?;
        assert_eq!(dataset.records().len(), 5);
        assert_eq!(
            dataset.date_span(),
            Some((
                NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 6, 2).unwrap()
            ))
        );

        let day = dataset.filter(&FilterSpec::SingleDay(
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
        ));
        let metrics = summarize(&day, &UtilityWindow::default());

        assert_eq!(metrics.modal_speed, Some(10.0));
        assert_eq!(metrics.dominant_direction, Some(90.0));
        assert_eq!(metrics.pct_time_in_utility_window, 75.0);
        assert_eq!(metrics.record_count, 4);

        // Four qualifying pairs on the day stay below the rose threshold.
        let rose = aggregate_rose(&day, MagnitudeField::Speed, &RoseConfig::default());
        assert_eq!(
            rose,
            RoseAggregation::InsufficientData {
                qualifying: 4,
                required: 5
            }
        );

        // The full set clears it.
        let rose = aggregate_rose(
            dataset.records(),
            MagnitudeField::Speed,
            &RoseConfig::default(),
        );
        assert!(matches!(rose, RoseAggregation::Bins(_)));
        Ok(())
    }

    #[tokio::test]
    async fn memory_cache_shares_the_record_set() -> Result<(), WindlogError> {
        let dir = tempfile::tempdir().unwrap();
        let (client, source) = client_with_csv(&dir).await;

        let first = client.dataset().source(source.clone()).call().await?;
        let second = client.dataset().source(source).call().await?;
        assert_eq!(first.records(), second.records());
        // Diagnostics survive the in-memory hit.
        assert_eq!(second.diagnostics().rows_scanned, 5);
        Ok(())
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() -> Result<(), WindlogError> {
        let dir = tempfile::tempdir().unwrap();
        let (client, source) = client_with_csv(&dir).await;

        client.dataset().source(source.clone()).call().await?;
        client.invalidate(&source).await?;

        // With the source file gone and caches dropped, the reload fails.
        let DataSource::File(path) = &source else {
            unreachable!()
        };
        std::fs::remove_file(path).unwrap();
        let result = client.dataset().source(source).call().await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn selector_inventory_comes_from_data() -> Result<(), WindlogError> {
        let dir = tempfile::tempdir().unwrap();
        let (client, source) = client_with_csv(&dir).await;

        let dataset = client.dataset().source(source).call().await?;
        assert_eq!(dataset.available_years(), vec![crate::types::period::Year(2023)]);
        assert_eq!(
            dataset.available_months(crate::types::period::Year(2023)),
            vec![6]
        );
        Ok(())
    }
}
