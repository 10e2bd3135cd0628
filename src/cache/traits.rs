//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

/// Trait for reference-data entities that can be cached.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Entity type name for storage namespacing (e.g. "city").
  fn entity_type() -> &'static str;
}

/// A cache lookup key derived from the query that produced the data.
pub trait QueryKey {
  /// Human-readable description for logging.
  fn description(&self) -> String;

  /// Raw key material; hashed before storage so keys stay fixed-length.
  fn key_input(&self) -> String;

  fn cache_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.key_input().as_bytes());
    hex::encode(hasher.finalize())
  }
}

/// Result from a cache-aware fetch, tagged with where the data came from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  pub data: T,
  pub source: CacheSource,
  /// When the data was stored (if from cache).
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where fetched data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from the network.
  Network,
  /// Data served from a non-expired cache entry.
  Cache,
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Key(String);

  impl QueryKey for Key {
    fn description(&self) -> String {
      self.0.clone()
    }

    fn key_input(&self) -> String {
      self.0.clone()
    }
  }

  #[test]
  fn test_cache_hash_is_stable() {
    let a = Key("cities".to_string()).cache_hash();
    let b = Key("cities".to_string()).cache_hash();
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
  }

  #[test]
  fn test_different_inputs_hash_differently() {
    let a = Key("cities".to_string()).cache_hash();
    let b = Key("brands".to_string()).cache_hash();
    assert_ne!(a, b);
  }
}
