//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::sync::Mutex;

use super::traits::Cacheable;

/// A cached list with its storage timestamp.
#[derive(Debug, Clone)]
pub struct CachedList<T> {
  pub items: Vec<T>,
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Get a cached list, regardless of age. Expiry is the layer's job.
  fn get_list<T: Cacheable>(&self, key: &str) -> Result<Option<CachedList<T>>>;

  /// Store a list under the key, overwriting unconditionally with the
  /// current timestamp.
  fn put_list<T: Cacheable>(&self, key: &str, items: &[T]) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get_list<T: Cacheable>(&self, _key: &str) -> Result<Option<CachedList<T>>> {
    Ok(None) // Always miss
  }

  fn put_list<T: Cacheable>(&self, _key: &str, _items: &[T]) -> Result<()> {
    Ok(()) // Discard
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

/// Schema for the reference-data cache.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ref_cache (
    cache_key TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (cache_key, entity_type)
);
"#;

impl SqliteStorage {
  /// Create a new SQLite storage at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Create an in-memory storage. Used in tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("r9s").join("cache.db"))
  }
}

impl CacheStorage for SqliteStorage {
  fn get_list<T: Cacheable>(&self, key: &str) -> Result<Option<CachedList<T>>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare(
        "SELECT data, cached_at FROM ref_cache
         WHERE cache_key = ? AND entity_type = ?",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let row: Option<(Vec<u8>, String)> = stmt
      .query_row(params![key, T::entity_type()], |row| {
        Ok((row.get(0)?, row.get(1)?))
      })
      .ok();

    match row {
      Some((data, cached_at_str)) => {
        let items: Vec<T> = serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to deserialize cached list: {}", e))?;
        let cached_at = parse_datetime(&cached_at_str)?;
        Ok(Some(CachedList { items, cached_at }))
      }
      None => Ok(None),
    }
  }

  fn put_list<T: Cacheable>(&self, key: &str, items: &[T]) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let data = serde_json::to_vec(items).map_err(|e| eyre!("Failed to serialize list: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO ref_cache (cache_key, entity_type, data, cached_at)
         VALUES (?, ?, ?, datetime('now'))",
        params![key, T::entity_type(), data],
      )
      .map_err(|e| eyre!("Failed to store list: {}", e))?;

    Ok(())
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::{Deserialize, Serialize};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Town {
    id: String,
    name: String,
  }

  impl Cacheable for Town {
    fn entity_type() -> &'static str {
      "town"
    }
  }

  fn towns() -> Vec<Town> {
    vec![
      Town {
        id: "t-1".to_string(),
        name: "Porto".to_string(),
      },
      Town {
        id: "t-2".to_string(),
        name: "Faro".to_string(),
      },
    ]
  }

  #[test]
  fn test_roundtrip() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.put_list("k1", &towns()).unwrap();

    let cached = storage.get_list::<Town>("k1").unwrap().unwrap();
    assert_eq!(cached.items, towns());
  }

  #[test]
  fn test_miss_on_unknown_key() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    assert!(storage.get_list::<Town>("nope").unwrap().is_none());
  }

  #[test]
  fn test_put_overwrites() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.put_list("k1", &towns()).unwrap();
    storage
      .put_list(
        "k1",
        &[Town {
          id: "t-3".to_string(),
          name: "Braga".to_string(),
        }],
      )
      .unwrap();

    let cached = storage.get_list::<Town>("k1").unwrap().unwrap();
    assert_eq!(cached.items.len(), 1);
    assert_eq!(cached.items[0].name, "Braga");
  }
}
