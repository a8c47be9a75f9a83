//! Cache module for storing normalized query results on disk
//!
//! This module provides a cache manager that persists query results to the
//! filesystem with a TTL per query kind. Stale, missing and unreadable entries
//! are all plain misses; expired entries are removed when they are read.

mod key;
mod manager;

pub use key::CacheKey;
pub use manager::CacheManager;

pub(crate) use manager::hash_key;
