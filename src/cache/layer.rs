//! Cache layer that orchestrates TTL logic with network fetching.

use chrono::{Duration, Utc};
use std::future::Future;
use std::sync::Arc;

use super::storage::CacheStorage;
use super::traits::{CacheResult, Cacheable, QueryKey};

/// Cache layer for reference data.
///
/// Entries expire lazily: anything older than the TTL is treated as
/// absent regardless of content. Storage failures on either side are
/// swallowed — a broken cache degrades to plain network fetching, it
/// never fails the caller.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
  ttl: Duration,
}

impl<S: CacheStorage> CacheLayer<S> {
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      ttl: Duration::hours(24),
    }
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  fn is_expired(&self, cached_at: chrono::DateTime<Utc>) -> bool {
    Utc::now() - cached_at > self.ttl
  }

  /// Fetch a list with cache-first strategy.
  ///
  /// 1. Check cache - a fresh entry is returned immediately
  /// 2. Absent or expired, fetch from network
  /// 3. Store the fresh result (best effort)
  ///
  /// Network errors propagate; an expired entry is never served in their
  /// place.
  pub async fn fetch_list<T, K, F, Fut, E>(
    &self,
    key: &K,
    fetcher: F,
  ) -> Result<CacheResult<Vec<T>>, E>
  where
    T: Cacheable,
    K: QueryKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
  {
    let hash = key.cache_hash();

    // Read errors count as a miss
    let cached = match self.storage.get_list::<T>(&hash) {
      Ok(entry) => entry,
      Err(e) => {
        tracing::warn!("cache read failed for {}: {}", key.description(), e);
        None
      }
    };

    if let Some(cached) = cached {
      if !self.is_expired(cached.cached_at) {
        tracing::debug!("cache hit for {}", key.description());
        return Ok(CacheResult::from_cache(cached.items, cached.cached_at));
      }
      tracing::debug!("cache expired for {}", key.description());
    }

    let data = fetcher().await?;

    if let Err(e) = self.storage.put_list(&hash, &data) {
      tracing::warn!("cache write failed for {}: {}", key.description(), e);
    }

    Ok(CacheResult::from_network(data))
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      ttl: self.ttl,
    }
  }
}
