//! Configuration types for the catalog components.
//!
//! Settings are layered: built-in defaults, then an optional TOML file
//! (`~/.config/pds-stac/config.toml` by default), then whatever the caller
//! overrides from the command line or environment.
//!
//! ```toml
//! [catalog]
//! index_name = "registry"
//! max_result_window = 10000
//!
//! [opensearch]
//! url = "https://search.example.org:9200"
//! username = "reader"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::error::AppError;

/// Catalog-level constants handed to every component at construction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Index holding every registry product.
    pub index_name: String,
    /// Sort field used when a search does not specify one.
    pub default_sort: String,
    /// Registry API prefix used to build related links (`{api_base_url}products/{lid}`).
    pub api_base_url: String,
    /// URL reported on the synthetic custodian provider.
    pub provider_url: String,
    pub license: String,
    pub stac_version: String,
    /// Upper bound on page size accepted by the index.
    pub max_result_window: usize,
    /// Maximum number of collections the extent aggregation returns.
    pub collection_bucket_size: usize,
    /// Page size used when the caller gives none.
    pub default_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            index_name: "registry".to_string(),
            default_sort: "ops:Harvest_Info/ops:harvest_date_time".to_string(),
            api_base_url: "http://pds.nasa.gov/api/search/1/".to_string(),
            provider_url: "https://pds.nasa.gov/".to_string(),
            license: "CC0-1.0".to_string(),
            stac_version: "1.0.0".to_string(),
            max_result_window: 10_000,
            collection_bucket_size: 1000,
            default_limit: 10,
        }
    }
}

/// Connection settings for the OpenSearch cluster.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OpenSearchConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl OpenSearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for OpenSearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            username: None,
            password: None,
            timeout_secs: 30,
            user_agent: "pds-stac/0.1".to_string(),
        }
    }
}

/// Root of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogConfig,
    pub opensearch: OpenSearchConfig,
}

/// Returns the default settings file location.
///
/// `None` when the platform has no configuration directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pds-stac").join("config.toml"))
}

/// Loads settings from `path`, or from [`default_config_path`] when `path` is `None`.
///
/// An explicit path must exist. A missing default file is not an error and
/// yields the built-in defaults.
///
/// # Errors
///
/// Returns `AppError::ConfigError` if the file cannot be read or parsed.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, AppError> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(Settings::default()),
        },
    };

    if !explicit && !path.exists() {
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| {
        AppError::ConfigError(format!("cannot read {}: {}", path.display(), e))
    })?;

    let settings: Settings = toml::from_str(&content).map_err(|e| {
        AppError::ConfigError(format!("cannot parse {}: {}", path.display(), e))
    })?;

    info!("Loaded settings from {}", path.display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_catalog_config_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.index_name, "registry");
        assert_eq!(config.default_sort, "ops:Harvest_Info/ops:harvest_date_time");
        assert_eq!(config.max_result_window, 10_000);
        assert_eq!(config.collection_bucket_size, 1000);
        assert_eq!(config.license, "CC0-1.0");
    }

    #[test]
    fn test_opensearch_config_defaults() {
        let config = OpenSearchConfig::default();
        assert_eq!(config.url, "http://localhost:9200");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.username.is_none());
    }

    #[test]
    fn test_load_partial_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[catalog]
index_name = "registry-test"
default_limit = 25

[opensearch]
url = "https://search.example.org:9200"
username = "reader"
"#
        )
        .unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.catalog.index_name, "registry-test");
        assert_eq!(settings.catalog.default_limit, 25);
        // untouched keys keep their defaults
        assert_eq!(settings.catalog.max_result_window, 10_000);
        assert_eq!(settings.opensearch.url, "https://search.example.org:9200");
        assert_eq!(settings.opensearch.username.as_deref(), Some("reader"));
        assert_eq!(settings.opensearch.timeout_secs, 30);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_settings(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[catalog\nindex_name = ").unwrap();
        let result = load_settings(Some(file.path()));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
