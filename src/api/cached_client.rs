//! API client with transparent caching for reference data.

use crate::cache::{CacheLayer, CacheStorage, SqliteStorage};

use super::cache::ApiQueryKey;
use super::client::Client;
use super::envelope::Page;
use super::error::Error;
use super::query::ListQuery;
use super::types::{City, Residence, ResidencePayload, Review, Status};

/// API client that serves reference data (cities) through the TTL cache
/// and passes everything else straight to the network.
///
/// Entity lists are deliberately never cached: the displayed page must
/// always be the latest successful fetch for the current filters.
pub struct CachedClient<S: CacheStorage = SqliteStorage> {
  inner: Client,
  cache: CacheLayer<S>,
}

// Manual impl: the storage itself lives behind an Arc in the layer, so
// cloning must not require S: Clone.
impl<S: CacheStorage> Clone for CachedClient<S> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
      cache: self.cache.clone(),
    }
  }
}

impl CachedClient<SqliteStorage> {
  /// Create a cached client with on-disk storage.
  pub fn new(inner: Client) -> color_eyre::Result<Self> {
    let storage = SqliteStorage::open()?;
    Ok(Self {
      inner,
      cache: CacheLayer::new(storage),
    })
  }
}

impl<S: CacheStorage> CachedClient<S> {
  /// Create a cached client over an explicit storage backend. Used in
  /// tests with in-memory or noop storage.
  pub fn with_storage(inner: Client, storage: S) -> Self {
    Self {
      inner,
      cache: CacheLayer::new(storage),
    }
  }

  /// Get cities for the location filter, cached for 24h.
  pub async fn cities(&self) -> Result<Vec<City>, Error> {
    let result = self
      .cache
      .fetch_list(&ApiQueryKey::Cities, || {
        let inner = self.inner.clone();
        async move { inner.list_cities().await }
      })
      .await?;

    Ok(result.data)
  }

  // Network pass-throughs; write operations are never cached.

  pub async fn list_residences(&self, query: &ListQuery) -> Result<Page<Residence>, Error> {
    self.inner.list_residences(query).await
  }

  pub async fn get_residence(&self, id: &str) -> Result<Residence, Error> {
    self.inner.get_residence(id).await
  }

  pub async fn update_residence(
    &self,
    id: &str,
    payload: &ResidencePayload,
  ) -> Result<Residence, Error> {
    self.inner.update_residence(id, payload).await
  }

  pub async fn update_residence_status(&self, id: &str, status: Status) -> Result<(), Error> {
    self.inner.update_residence_status(id, status).await
  }

  pub async fn delete_residence(&self, id: &str) -> Result<(), Error> {
    self.inner.delete_residence(id).await
  }

  pub async fn list_reviews(&self, query: &ListQuery) -> Result<Page<Review>, Error> {
    self.inner.list_reviews(query).await
  }

  pub async fn update_review_status(&self, id: &str, status: Status) -> Result<(), Error> {
    self.inner.update_review_status(id, status).await
  }

  pub async fn delete_review(&self, id: &str) -> Result<(), Error> {
    self.inner.delete_review(id).await
  }
}
