use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::PathBuf;

pub(crate) const CACHE_FILE_PREFIX: &str = "windlog-";

/// Identity of the input table: a remotely published delimited file or a
/// local spreadsheet export.
///
/// The source identity is the cache key, both for the in-memory record set
/// and for the on-disk parquet copy of the canonical frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl DataSource {
    /// Stable file name for this source's parquet cache entry.
    pub(crate) fn cache_file_name(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        format!("{}{:016x}.parquet", CACHE_FILE_PREFIX, hasher.finish())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_file_name_is_stable_per_identity() {
        let a = DataSource::Url("https://example.com/wind.csv".to_string());
        let b = DataSource::Url("https://example.com/wind.csv".to_string());
        let c = DataSource::File(PathBuf::from("/tmp/wind.csv"));

        assert_eq!(a.cache_file_name(), b.cache_file_name());
        assert_ne!(a.cache_file_name(), c.cache_file_name());
        assert!(a.cache_file_name().starts_with(CACHE_FILE_PREFIX));
        assert!(a.cache_file_name().ends_with(".parquet"));
    }
}
