//! TTL cache for reference data.
//!
//! This module provides an API-agnostic read-through cache that:
//! - Stores whole lists under a hashed query key
//! - Expires entries lazily on read (default TTL 24h)
//! - Fails open: storage errors degrade to a plain network fetch

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{CacheStorage, CachedList, NoopStorage, SqliteStorage};
pub use traits::{CacheResult, CacheSource, Cacheable, QueryKey};
