//! Filter state with canonical query-string synchronization.
//!
//! The serialized string is the source of truth: every mutation writes
//! the string and then reads it back, so whatever state the view holds
//! is always exactly what a fresh parse of the string would produce.
//! Filter mutations reset the page to 1; page navigation does not.
//! `FilterHistory` gives back/forward over previous strings, the way
//! browser history would.

use std::collections::BTreeSet;

use url::form_urlencoded;

use crate::api::query::{ListQuery, SortOrder};
use crate::api::types::Status;

/// Sortable columns, sent to the server verbatim. Sorting is always
/// server-executed; this never reorders rows locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
  Name,
  Status,
  UpdatedAt,
}

impl SortKey {
  pub fn as_str(self) -> &'static str {
    match self {
      SortKey::Name => "name",
      SortKey::Status => "status",
      SortKey::UpdatedAt => "updatedAt",
    }
  }

  pub fn parse(s: &str) -> Option<SortKey> {
    match s {
      "name" => Some(SortKey::Name),
      "status" => Some(SortKey::Status),
      "updatedAt" => Some(SortKey::UpdatedAt),
      _ => None,
    }
  }

  /// Next key in the cycle: name -> status -> updatedAt -> name.
  pub fn next(self) -> SortKey {
    match self {
      SortKey::Name => SortKey::Status,
      SortKey::Status => SortKey::UpdatedAt,
      SortKey::UpdatedAt => SortKey::Name,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      SortKey::Name => "name",
      SortKey::Status => "status",
      SortKey::UpdatedAt => "updated",
    }
  }
}

/// The current list filters plus page, kept in lock-step with the
/// canonical string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
  query: String,
  statuses: BTreeSet<Status>,
  city_ids: BTreeSet<String>,
  sort: Option<(SortKey, SortOrder)>,
  page: u32,
}

impl Default for FilterState {
  fn default() -> Self {
    Self {
      query: String::new(),
      statuses: BTreeSet::new(),
      city_ids: BTreeSet::new(),
      sort: None,
      page: 1,
    }
  }
}

impl FilterState {
  pub fn query(&self) -> &str {
    &self.query
  }

  pub fn statuses(&self) -> &BTreeSet<Status> {
    &self.statuses
  }

  pub fn city_ids(&self) -> &BTreeSet<String> {
    &self.city_ids
  }

  pub fn sort(&self) -> Option<(SortKey, SortOrder)> {
    self.sort
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  /// Serialize to the canonical query string. Only active filters are
  /// present; `page` always is.
  pub fn to_query_string(&self) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if !self.query.is_empty() {
      serializer.append_pair("query", &self.query);
    }
    for status in &self.statuses {
      serializer.append_pair("status", status.as_str());
    }
    for city_id in &self.city_ids {
      serializer.append_pair("cityId", city_id);
    }
    if let Some((key, order)) = self.sort {
      serializer.append_pair("sort", key.as_str());
      serializer.append_pair("order", order.as_str());
    }
    serializer.append_pair("page", &self.page.to_string());
    serializer.finish()
  }

  /// Reconstruct state from a query string. Unknown parameters and
  /// unparseable values are ignored.
  pub fn parse(s: &str) -> Self {
    let mut state = Self::default();
    let mut sort_key = None;
    let mut order = SortOrder::default();

    for (key, value) in form_urlencoded::parse(s.as_bytes()) {
      match key.as_ref() {
        "query" => state.query = value.into_owned(),
        "status" => {
          if let Some(status) = Status::parse(&value) {
            state.statuses.insert(status);
          }
        }
        "cityId" => {
          state.city_ids.insert(value.into_owned());
        }
        "sort" => sort_key = SortKey::parse(&value),
        "order" => {
          if value == "asc" {
            order = SortOrder::Asc;
          }
        }
        "page" => {
          if let Ok(page) = value.parse::<u32>() {
            state.page = page.max(1);
          }
        }
        _ => {}
      }
    }

    state.sort = sort_key.map(|key| (key, order));
    state
  }

  /// Apply a filter mutation: reset the page to 1, write the canonical
  /// string, and read the state back from it.
  fn mutate_filters(&mut self, f: impl FnOnce(&mut Self)) {
    let mut next = self.clone();
    f(&mut next);
    next.page = 1;
    *self = Self::parse(&next.to_query_string());
  }

  pub fn set_query(&mut self, query: String) {
    self.mutate_filters(|state| state.query = query);
  }

  pub fn toggle_status(&mut self, status: Status) {
    self.mutate_filters(|state| {
      if !state.statuses.remove(&status) {
        state.statuses.insert(status);
      }
    });
  }

  pub fn toggle_city(&mut self, city_id: String) {
    self.mutate_filters(|state| {
      if !state.city_ids.remove(&city_id) {
        state.city_ids.insert(city_id);
      }
    });
  }

  pub fn clear_filters(&mut self) {
    self.mutate_filters(|state| {
      state.query.clear();
      state.statuses.clear();
      state.city_ids.clear();
    });
  }

  /// Cycle the sort key (none -> name -> status -> updatedAt -> name),
  /// resetting direction. A sort change is a filter mutation: page resets.
  pub fn cycle_sort(&mut self) {
    self.mutate_filters(|state| {
      state.sort = match state.sort {
        None => Some((SortKey::Name, SortOrder::default())),
        Some((key, _)) => Some((key.next(), SortOrder::default())),
      };
    });
  }

  pub fn toggle_sort_order(&mut self) {
    self.mutate_filters(|state| {
      if let Some((key, order)) = state.sort {
        state.sort = Some((key, order.toggled()));
      }
    });
  }

  /// Page navigation keeps the filters and does not reset anything; it
  /// still round-trips through the string.
  pub fn set_page(&mut self, page: u32) {
    let mut next = self.clone();
    next.page = page.max(1);
    *self = Self::parse(&next.to_query_string());
  }

  /// Request parameters for the fetcher.
  pub fn to_list_query(&self, limit: u32) -> ListQuery {
    let mut query = ListQuery::default()
      .with_page(self.page)
      .with_limit(limit)
      .with_statuses(self.statuses.iter().copied())
      .with_city_ids(self.city_ids.iter().cloned());
    if !self.query.is_empty() {
      query = query.with_query(self.query.clone());
    }
    if let Some((key, order)) = self.sort {
      query = query.with_sort(key.as_str(), order);
    }
    query
  }

  /// One-line summary for the view title, e.g. `marina · 2 statuses`.
  pub fn summary(&self) -> Option<String> {
    let mut parts = Vec::new();
    if !self.query.is_empty() {
      parts.push(format!("\"{}\"", self.query));
    }
    match self.statuses.len() {
      0 => {}
      1 => parts.push(
        self
          .statuses
          .iter()
          .next()
          .map(|s| s.label().to_string())
          .unwrap_or_default(),
      ),
      n => parts.push(format!("{} statuses", n)),
    }
    if !self.city_ids.is_empty() {
      parts.push(format!("{} cities", self.city_ids.len()));
    }
    if parts.is_empty() {
      None
    } else {
      Some(parts.join(" · "))
    }
  }
}

/// Back/forward navigation over filter strings.
pub struct FilterHistory {
  entries: Vec<String>,
  pos: usize,
}

impl FilterHistory {
  pub fn new(initial: String) -> Self {
    Self {
      entries: vec![initial],
      pos: 0,
    }
  }

  /// Record a new string, truncating any forward entries. Recording the
  /// current string again is a no-op.
  pub fn record(&mut self, entry: String) {
    if self.entries[self.pos] == entry {
      return;
    }
    self.entries.truncate(self.pos + 1);
    self.entries.push(entry);
    self.pos += 1;
  }

  pub fn back(&mut self) -> Option<&str> {
    if self.pos == 0 {
      return None;
    }
    self.pos -= 1;
    Some(&self.entries[self.pos])
  }

  pub fn forward(&mut self) -> Option<&str> {
    if self.pos + 1 >= self.entries.len() {
      return None;
    }
    self.pos += 1;
    Some(&self.entries[self.pos])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_serializes_page_1_only() {
    assert_eq!(FilterState::default().to_query_string(), "page=1");
  }

  #[test]
  fn test_mutation_contains_exactly_active_values_and_page_1() {
    let mut state = FilterState::default();
    state.set_page(3);
    state.set_query("marina".to_string());
    state.toggle_status(Status::Active);

    // Pending < Active in declaration order, so Pending serializes first.
    state.toggle_status(Status::Pending);

    assert_eq!(
      state.to_query_string(),
      "query=marina&status=PENDING&status=ACTIVE&page=1"
    );
  }

  #[test]
  fn test_filter_mutation_resets_page() {
    let mut state = FilterState::default();
    state.set_page(5);
    assert_eq!(state.page(), 5);

    state.toggle_city("c-1".to_string());
    assert_eq!(state.page(), 1);
  }

  #[test]
  fn test_page_navigation_keeps_filters() {
    let mut state = FilterState::default();
    state.set_query("spa".to_string());
    state.set_page(4);

    assert_eq!(state.query(), "spa");
    assert_eq!(state.to_query_string(), "query=spa&page=4");
  }

  #[test]
  fn test_toggle_off_removes_value() {
    let mut state = FilterState::default();
    state.toggle_status(Status::Draft);
    state.toggle_status(Status::Draft);
    assert_eq!(state.to_query_string(), "page=1");
  }

  #[test]
  fn test_round_trip() {
    let mut state = FilterState::default();
    state.set_query("beach front".to_string());
    state.toggle_status(Status::Pending);
    state.toggle_city("c-7".to_string());
    state.cycle_sort();
    state.set_page(2);

    let parsed = FilterState::parse(&state.to_query_string());
    assert_eq!(parsed, state);
  }

  #[test]
  fn test_parse_ignores_unknown_params_and_bad_values() {
    let state = FilterState::parse("status=BOGUS&utm_source=x&page=abc&cityId=c-1");
    assert!(state.statuses().is_empty());
    assert_eq!(state.page(), 1);
    assert_eq!(state.city_ids().len(), 1);
  }

  #[test]
  fn test_sort_round_trips_with_order() {
    let mut state = FilterState::default();
    state.cycle_sort();
    state.toggle_sort_order();

    let s = state.to_query_string();
    assert_eq!(s, "sort=name&order=asc&page=1");
    assert_eq!(FilterState::parse(&s), state);
  }

  #[test]
  fn test_cycle_sort_walks_keys() {
    let mut state = FilterState::default();
    state.cycle_sort();
    assert_eq!(state.sort().unwrap().0, SortKey::Name);
    state.cycle_sort();
    assert_eq!(state.sort().unwrap().0, SortKey::Status);
    state.cycle_sort();
    assert_eq!(state.sort().unwrap().0, SortKey::UpdatedAt);
  }

  #[test]
  fn test_history_back_and_forward() {
    let mut state = FilterState::default();
    let mut history = FilterHistory::new(state.to_query_string());

    state.set_query("a".to_string());
    history.record(state.to_query_string());
    state.set_query("ab".to_string());
    history.record(state.to_query_string());

    let back = history.back().unwrap().to_string();
    assert_eq!(FilterState::parse(&back).query(), "a");

    let back = history.back().unwrap().to_string();
    assert_eq!(FilterState::parse(&back).query(), "");
    assert!(history.back().is_none());

    let forward = history.forward().unwrap().to_string();
    assert_eq!(FilterState::parse(&forward).query(), "a");
  }

  #[test]
  fn test_history_truncates_forward_entries_on_record() {
    let mut history = FilterHistory::new("page=1".to_string());
    history.record("query=a&page=1".to_string());
    history.back();
    history.record("query=b&page=1".to_string());

    assert!(history.forward().is_none());
    assert_eq!(history.back(), Some("page=1"));
  }

  #[test]
  fn test_record_same_string_is_noop() {
    let mut history = FilterHistory::new("page=1".to_string());
    history.record("page=1".to_string());
    assert!(history.back().is_none());
  }
}
