//! Caching implementations for API reference data.

use crate::cache::{Cacheable, QueryKey};

use super::types::City;

impl Cacheable for City {
  fn entity_type() -> &'static str {
    "city"
  }
}

/// Query key types for cached API calls.
#[derive(Clone, Debug)]
pub enum ApiQueryKey {
  /// The full city list used for location filters.
  Cities,
}

impl QueryKey for ApiQueryKey {
  fn key_input(&self) -> String {
    match self {
      Self::Cities => "cities".to_string(),
    }
  }

  fn description(&self) -> String {
    match self {
      Self::Cities => "city list".to_string(),
    }
  }
}
