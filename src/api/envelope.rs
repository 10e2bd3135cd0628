//! Wire envelope shared by every Residia endpoint.

use serde::Deserialize;

/// Standard response envelope:
/// `{ data, statusCode, message, pagination?, timestamp, path }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
  pub data: T,
  pub status_code: u16,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub pagination: Option<Pagination>,
  #[serde(default)]
  pub timestamp: String,
  #[serde(default)]
  pub path: String,
}

/// Server-authoritative paging info. The client never computes totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub page: u32,
  pub total_pages: u32,
  pub total_items: u64,
  pub limit: u32,
}

impl Pagination {
  pub fn has_next(&self) -> bool {
    self.page < self.total_pages
  }

  pub fn has_prev(&self) -> bool {
    self.page > 1
  }
}

/// One page of a collection, as returned by list endpoints.
#[derive(Debug, Clone)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_envelope_with_pagination() {
    let body = r#"{
      "data": [1, 2, 3],
      "statusCode": 200,
      "message": "OK",
      "pagination": { "page": 1, "totalPages": 3, "totalItems": 25, "limit": 10 },
      "timestamp": "2025-06-01T12:00:00Z",
      "path": "/api/v1/residences"
    }"#;

    let envelope: Envelope<Vec<u32>> = serde_json::from_str(body).unwrap();
    assert_eq!(envelope.data, vec![1, 2, 3]);
    assert_eq!(envelope.status_code, 200);

    let paging = envelope.pagination.unwrap();
    assert_eq!(paging.page, 1);
    assert_eq!(paging.total_pages, 3);
    assert!(paging.has_next());
    assert!(!paging.has_prev());
  }

  #[test]
  fn test_envelope_without_pagination() {
    let body = r#"{ "data": { "id": "m-1" }, "statusCode": 201 }"#;

    let envelope: Envelope<serde_json::Value> = serde_json::from_str(body).unwrap();
    assert!(envelope.pagination.is_none());
    assert!(envelope.message.is_none());
  }

  #[test]
  fn test_last_page_has_no_next() {
    let paging = Pagination {
      page: 3,
      total_pages: 3,
      total_items: 25,
      limit: 10,
    };
    assert!(!paging.has_next());
    assert!(paging.has_prev());
  }
}
