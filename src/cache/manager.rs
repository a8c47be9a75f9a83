//! Cache manager for persisting query results to disk
//!
//! Provides a `CacheManager` that stores serializable data to JSON files with
//! expiry timestamps. File names are a hex hash of the cache key, never of the
//! payload.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

/// Manages reading and writing cached data to disk
///
/// The cache manager stores data as JSON files in an XDG-compliant cache
/// directory (`~/.cache/flightcli/` on Linux). There is no capacity bound and
/// no background sweep: an entry lives until it is read after its expiry.
///
/// Reads and writes are not atomic with respect to other processes sharing the
/// directory. Two processes may race a read-then-delete against a write; the
/// loser just sees a miss.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "flightcli")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path of the file backing `key`
    pub fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", hash_key(key)))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes data to the cache, replacing any existing entry for `key`
    ///
    /// # Arguments
    /// * `key` - Canonical query key (e.g., "status:KE38")
    /// * `data` - The data to cache (must implement Serialize)
    /// * `ttl` - How long the cache entry should be considered fresh
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation or file writing fails
    pub fn write<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) -> io::Result<()> {
        self.write_at(key, data, ttl, Utc::now())
    }

    /// Same as [`write`](Self::write) with an explicit "now"
    pub fn write_at<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> io::Result<()> {
        self.ensure_dir()?;

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now + ttl,
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)?;
        log::debug!("cache write {} (ttl {}s)", key, ttl.num_seconds());
        Ok(())
    }

    /// Reads a fresh entry from the cache
    ///
    /// Returns `None` when the file is missing, cannot be parsed as an entry of
    /// type `T`, or has expired. Expired files are deleted before returning.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read_at(key, Utc::now())
    }

    /// Same as [`read`](Self::read) with an explicit "now"
    pub fn read_at<T: DeserializeOwned>(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let path = self.cache_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    log::debug!("cache read failed for {}: {}", key, e);
                }
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("ignoring unreadable cache entry for {}: {}", key, e);
                return None;
            }
        };

        if now > entry.expires_at {
            log::debug!("cache entry for {} expired at {}", key, entry.expires_at);
            let _ = fs::remove_file(&path);
            return None;
        }

        log::debug!("cache hit {}", key);
        Some(entry.data)
    }
}

/// Hex digest of a cache key, used as the file stem
pub(crate) fn hash_key(key: &str) -> String {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    fn sample() -> TestData {
        TestData {
            name: "KE38".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_write_creates_hashed_file_in_cache_directory() {
        let (cache, temp_dir) = create_test_cache();

        cache
            .write("status:KE38", &sample(), Duration::from_secs(60))
            .expect("Write should succeed");

        let path = cache.cache_path("status:KE38");
        assert!(path.starts_with(temp_dir.path()));
        assert!(path.exists(), "Cache file should exist");

        let stem = path.file_stem().unwrap().to_string_lossy().to_string();
        assert_eq!(stem.len(), 16);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));

        let content = fs::read_to_string(&path).expect("Should read file");
        assert!(content.contains("\"expires_at\""));
        assert!(content.contains("\"KE38\""));
    }

    #[test]
    fn test_same_key_same_path_distinct_keys_distinct_paths() {
        let (cache, _temp_dir) = create_test_cache();
        assert_eq!(cache.cache_path("status:KE38"), cache.cache_path("status:KE38"));
        assert_ne!(cache.cache_path("status:KE38"), cache.cache_path("status:KE39"));
        assert_ne!(
            cache.cache_path("airport:JFK:departures"),
            cache.cache_path("airport:JFK:arrivals")
        );
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let (cache, _temp_dir) = create_test_cache();

        let result: Option<TestData> = cache.read("nonexistent_key");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_read_within_ttl_is_a_hit() {
        let (cache, _temp_dir) = create_test_cache();

        cache
            .write("status:KE38", &sample(), Duration::from_secs(60))
            .expect("Write should succeed");

        let result: Option<TestData> = cache.read("status:KE38");
        assert_eq!(result, Some(sample()));
    }

    #[test]
    fn test_read_after_expiry_is_a_miss_and_removes_file() {
        let (cache, _temp_dir) = create_test_cache();
        let now = Utc::now();

        cache
            .write_at("status:KE38", &sample(), Duration::from_secs(60), now)
            .expect("Write should succeed");
        let path = cache.cache_path("status:KE38");

        let still_fresh: Option<TestData> =
            cache.read_at("status:KE38", now + chrono::Duration::seconds(59));
        assert!(still_fresh.is_some());

        let later = now + chrono::Duration::seconds(61);
        let expired: Option<TestData> = cache.read_at("status:KE38", later);
        assert!(expired.is_none());
        assert!(!path.exists(), "Expired entry should be deleted");

        let again: Option<TestData> = cache.read_at("status:KE38", later);
        assert!(again.is_none());
    }

    #[test]
    fn test_corrupt_file_is_a_miss() {
        let (cache, _temp_dir) = create_test_cache();
        cache.ensure_dir().unwrap();
        fs::write(cache.cache_path("status:KE38"), b"\x00\xffnot json{{").unwrap();

        let result: Option<TestData> = cache.read("status:KE38");
        assert!(result.is_none());
    }

    #[test]
    fn test_entry_of_wrong_shape_is_a_miss() {
        let (cache, _temp_dir) = create_test_cache();
        cache
            .write("status:KE38", &vec![1, 2, 3], Duration::from_secs(60))
            .unwrap();

        let result: Option<TestData> = cache.read("status:KE38");
        assert!(result.is_none());
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let cache = CacheManager::with_dir(nested_path.clone());

        cache
            .write("search:JFK:LAX", &sample(), Duration::from_secs(300))
            .expect("Write should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(cache.cache_path("search:JFK:LAX").exists());
    }

    #[test]
    fn test_overwrite_existing_cache() {
        let (cache, _temp_dir) = create_test_cache();
        let first = TestData {
            name: "first".to_string(),
            value: 1,
        };
        let second = TestData {
            name: "second".to_string(),
            value: 2,
        };

        cache.write("overwrite_key", &first, Duration::from_secs(60)).unwrap();
        cache.write("overwrite_key", &second, Duration::from_secs(60)).unwrap();

        let result: Option<TestData> = cache.read("overwrite_key");
        assert_eq!(result, Some(second), "Cache should contain latest data");
    }

    #[test]
    fn test_overwrite_resets_expiry() {
        let (cache, _temp_dir) = create_test_cache();
        let now = Utc::now();

        cache
            .write_at("k", &sample(), Duration::from_secs(10), now)
            .unwrap();
        cache
            .write_at("k", &sample(), Duration::from_secs(100), now)
            .unwrap();

        let result: Option<TestData> = cache.read_at("k", now + chrono::Duration::seconds(50));
        assert!(result.is_some());
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheManager::new() {
            let path_str = cache.dir().to_string_lossy();
            assert!(
                path_str.contains("flightcli"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
