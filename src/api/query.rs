//! Query-string construction for list endpoints.
//!
//! Only active filters are serialized; statuses and city ids are appended
//! as repeated parameters (`status=ACTIVE&status=PENDING`). Sorting is a
//! request parameter only — rows are never re-ordered client-side.

use url::Url;

use super::types::Status;

/// Sort order for list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  pub fn as_str(self) -> &'static str {
    match self {
      SortOrder::Asc => "asc",
      SortOrder::Desc => "desc",
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      SortOrder::Asc => SortOrder::Desc,
      SortOrder::Desc => SortOrder::Asc,
    }
  }
}

/// Parameters for `GET /{resource}?page=&limit=&query=&status=&cityId=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
  /// Page number, 1-indexed.
  pub page: u32,
  /// Results per page. `None` uses the server default.
  pub limit: Option<u32>,
  /// Free-text search.
  pub query: Option<String>,
  pub statuses: Vec<Status>,
  pub city_ids: Vec<String>,
  /// Server-side sort key, e.g. `name` or `updatedAt`.
  pub sort: Option<String>,
  pub order: SortOrder,
}

impl Default for ListQuery {
  fn default() -> Self {
    Self {
      page: 1,
      limit: None,
      query: None,
      statuses: Vec::new(),
      city_ids: Vec::new(),
      sort: None,
      order: SortOrder::default(),
    }
  }
}

impl ListQuery {
  pub fn with_page(mut self, page: u32) -> Self {
    self.page = page;
    self
  }

  pub fn with_limit(mut self, limit: u32) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn with_query(mut self, query: impl Into<String>) -> Self {
    let query = query.into();
    self.query = if query.is_empty() { None } else { Some(query) };
    self
  }

  pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = Status>) -> Self {
    self.statuses = statuses.into_iter().collect();
    self
  }

  pub fn with_city_ids(mut self, city_ids: impl IntoIterator<Item = String>) -> Self {
    self.city_ids = city_ids.into_iter().collect();
    self
  }

  pub fn with_sort(mut self, sort: impl Into<String>, order: SortOrder) -> Self {
    self.sort = Some(sort.into());
    self.order = order;
    self
  }

  /// Appends this query's parameters to the given URL.
  pub fn add_to_url(&self, url: &Url) -> Url {
    let mut url = url.clone();
    {
      let mut pairs = url.query_pairs_mut();
      pairs.append_pair("page", &self.page.to_string());
      if let Some(limit) = self.limit {
        pairs.append_pair("limit", &limit.to_string());
      }
      if let Some(query) = &self.query {
        pairs.append_pair("query", query);
      }
      for status in &self.statuses {
        pairs.append_pair("status", status.as_str());
      }
      for city_id in &self.city_ids {
        pairs.append_pair("cityId", city_id);
      }
      if let Some(sort) = &self.sort {
        pairs.append_pair("sort", sort);
        pairs.append_pair("order", self.order.as_str());
      }
    }
    url
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn base() -> Url {
    Url::parse("https://api.example.com/api/v1/residences").unwrap()
  }

  #[test]
  fn test_default_serializes_page_only() {
    let url = ListQuery::default().add_to_url(&base());
    assert_eq!(url.query(), Some("page=1"));
  }

  #[test]
  fn test_statuses_are_repeated_params() {
    let url = ListQuery::default()
      .with_statuses([Status::Active, Status::Pending])
      .add_to_url(&base());
    assert_eq!(url.query(), Some("page=1&status=ACTIVE&status=PENDING"));
  }

  #[test]
  fn test_city_ids_are_repeated_params() {
    let url = ListQuery::default()
      .with_city_ids(["c-1".to_string(), "c-2".to_string()])
      .add_to_url(&base());
    assert_eq!(url.query(), Some("page=1&cityId=c-1&cityId=c-2"));
  }

  #[test]
  fn test_empty_query_is_omitted() {
    let url = ListQuery::default().with_query("").add_to_url(&base());
    assert_eq!(url.query(), Some("page=1"));
  }

  #[test]
  fn test_sort_carries_order() {
    let url = ListQuery::default()
      .with_sort("updatedAt", SortOrder::Asc)
      .add_to_url(&base());
    assert_eq!(url.query(), Some("page=1&sort=updatedAt&order=asc"));
  }

  #[test]
  fn test_full_query() {
    let url = ListQuery::default()
      .with_page(2)
      .with_limit(20)
      .with_query("marina")
      .with_statuses([Status::Active])
      .with_city_ids(["c-9".to_string()])
      .add_to_url(&base());
    assert_eq!(
      url.query(),
      Some("page=2&limit=20&query=marina&status=ACTIVE&cityId=c-9")
    );
  }
}
