//! Resolved runtime configuration
//!
//! Everything the binary needs to build a provider and a cache, passed around
//! as a plain value rather than held in globals.

use clap::ValueEnum;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::{hash_key, CacheManager};
use crate::data::UnknownStatusRank;
use crate::error::FlightError;
use crate::providers::{
    http_client, AviationStackProvider, FixtureData, FixtureProvider, OpenSkyProvider, Provider,
};

/// Which backend to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProviderKind {
    #[default]
    #[value(name = "aviationstack")]
    AviationStack,
    #[value(name = "opensky")]
    OpenSky,
    #[value(name = "fixture")]
    Fixture,
}

impl ProviderKind {
    /// Base name of this backend's cache sub-directory
    fn cache_namespace(&self) -> &'static str {
        match self {
            ProviderKind::AviationStack => "aviationstack",
            ProviderKind::OpenSky => "opensky",
            ProviderKind::Fixture => "fixture",
        }
    }
}

/// Configuration derived from CLI arguments and environment
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub provider: ProviderKind,
    /// AviationStack access key
    pub api_key: Option<String>,
    /// Cache root override; the XDG cache directory is used otherwise
    pub cache_dir: Option<PathBuf>,
    pub use_cache: bool,
    /// JSON file served by the fixture provider instead of the built-in sample
    pub fixture: Option<PathBuf>,
    pub unknown_rank: UnknownStatusRank,
}

impl Config {
    /// Builds the configured provider
    ///
    /// Fails with [`FlightError::MissingApiKey`] before any network activity
    /// when AviationStack is selected without a key.
    pub fn build_provider(&self) -> Result<Provider, FlightError> {
        match self.provider {
            ProviderKind::AviationStack => {
                let api_key = self
                    .api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .ok_or(FlightError::MissingApiKey)?;
                Ok(Provider::AviationStack(
                    AviationStackProvider::new(http_client(), api_key)
                        .with_unknown_rank(self.unknown_rank),
                ))
            }
            ProviderKind::OpenSky => Ok(Provider::OpenSky(OpenSkyProvider::new(http_client()))),
            ProviderKind::Fixture => {
                let data = match &self.fixture {
                    Some(path) => FixtureData::from_file(path)?,
                    None => FixtureData::sample(),
                };
                Ok(Provider::Fixture(FixtureProvider::new(data)))
            }
        }
    }

    /// Cache sub-directory for the data source this config resolves to
    ///
    /// Everything that can change the answer to the same query gets its own
    /// directory: the backend, the fixture file (path and modification time)
    /// and the resolver policy for unknown statuses.
    pub fn cache_namespace(&self) -> String {
        let base = self.provider.cache_namespace();
        match self.provider {
            ProviderKind::AviationStack => match self.unknown_rank {
                UnknownStatusRank::Last => base.to_string(),
                UnknownStatusRank::First => format!("{}-legacy", base),
            },
            ProviderKind::OpenSky => base.to_string(),
            ProviderKind::Fixture => match &self.fixture {
                Some(path) => format!("{}-{}", base, fixture_fingerprint(path)),
                None => base.to_string(),
            },
        }
    }

    /// Builds the cache for the configured data source, if caching is enabled
    pub fn cache(&self) -> Option<CacheManager> {
        if !self.use_cache {
            return None;
        }
        let root = match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => CacheManager::new()?.dir().to_path_buf(),
        };
        Some(CacheManager::with_dir(root.join(self.cache_namespace())))
    }
}

/// Identifies one version of a fixture file
fn fixture_fingerprint(path: &Path) -> String {
    let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
    hash_key(&format!("{}|{:?}", path.display(), modified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FlightProvider;
    use crate::service::FlightService;
    use tempfile::TempDir;

    #[test]
    fn test_missing_api_key_fails_before_network() {
        let config = Config {
            provider: ProviderKind::AviationStack,
            api_key: None,
            ..Default::default()
        };
        assert!(matches!(config.build_provider(), Err(FlightError::MissingApiKey)));

        let blank = Config {
            api_key: Some("   ".to_string()),
            ..config
        };
        assert!(matches!(blank.build_provider(), Err(FlightError::MissingApiKey)));
    }

    #[test]
    fn test_builds_each_provider() {
        let aviationstack = Config {
            provider: ProviderKind::AviationStack,
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        assert_eq!(aviationstack.build_provider().unwrap().name(), "AviationStack");

        let opensky = Config {
            provider: ProviderKind::OpenSky,
            ..Default::default()
        };
        assert_eq!(opensky.build_provider().unwrap().name(), "OpenSky");

        let fixture = Config {
            provider: ProviderKind::Fixture,
            ..Default::default()
        };
        assert_eq!(fixture.build_provider().unwrap().name(), "Fixture");
    }

    #[test]
    fn test_bad_fixture_path_is_an_error() {
        let config = Config {
            provider: ProviderKind::Fixture,
            fixture: Some(PathBuf::from("/nonexistent/fixture.json")),
            ..Default::default()
        };
        assert!(matches!(config.build_provider(), Err(FlightError::Fixture(_))));
    }

    #[test]
    fn test_cache_disabled() {
        let config = Config {
            use_cache: false,
            ..Default::default()
        };
        assert!(config.cache().is_none());
    }

    #[test]
    fn test_cache_is_namespaced_per_provider() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            provider: ProviderKind::OpenSky,
            cache_dir: Some(temp_dir.path().to_path_buf()),
            use_cache: true,
            ..Default::default()
        };

        let cache = config.cache().unwrap();
        assert_eq!(cache.dir(), temp_dir.path().join("opensky"));
    }

    #[test]
    fn test_resolver_policy_gets_its_own_namespace() {
        let current = Config {
            provider: ProviderKind::AviationStack,
            ..Default::default()
        };
        let legacy = Config {
            unknown_rank: UnknownStatusRank::First,
            ..current.clone()
        };
        assert_eq!(current.cache_namespace(), "aviationstack");
        assert_eq!(legacy.cache_namespace(), "aviationstack-legacy");
    }

    fn write_fixture(dir: &Path, name: &str, airline: &str) -> PathBuf {
        let mut data = FixtureData::sample();
        data.flights[0].airline = airline.to_string();
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string(&data).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_fixture_files_do_not_share_cache_entries() {
        let temp_dir = TempDir::new().unwrap();
        let file_a = write_fixture(temp_dir.path(), "a.json", "From File A");
        let file_b = write_fixture(temp_dir.path(), "b.json", "From File B");

        let config_a = Config {
            provider: ProviderKind::Fixture,
            cache_dir: Some(temp_dir.path().join("cache")),
            use_cache: true,
            fixture: Some(file_a),
            ..Default::default()
        };
        let config_b = Config {
            fixture: Some(file_b),
            ..config_a.clone()
        };
        assert_ne!(config_a.cache_namespace(), config_b.cache_namespace());
        assert_ne!(config_a.cache_namespace(), "fixture");

        let service_a = FlightService::new(config_a.build_provider().unwrap(), config_a.cache());
        let first = service_a.get_status("DL123").await.unwrap();
        assert_eq!(first.data.airline, "From File A");

        let service_b = FlightService::new(config_b.build_provider().unwrap(), config_b.cache());
        let second = service_b.get_status("DL123").await.unwrap();
        assert_eq!(second.data.airline, "From File B");
        assert!(!second.cached);

        // The same file still hits its own entry
        let again = service_a.get_status("DL123").await.unwrap();
        assert!(again.cached);
        assert_eq!(again.data.airline, "From File A");
    }
}
