//! Domain types for back-office entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status shared by back-office entities.
///
/// `transitions()` only gates which entries the status picker offers; the
/// server remains the authority and may still reject a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
  Draft,
  Pending,
  Active,
  Rejected,
  Deleted,
  Archived,
}

impl Status {
  /// Statuses this one may move to, in picker order.
  pub fn transitions(self) -> &'static [Status] {
    match self {
      Status::Draft => &[Status::Pending],
      Status::Pending => &[Status::Active, Status::Rejected, Status::Deleted],
      Status::Active => &[Status::Archived, Status::Deleted],
      Status::Rejected | Status::Deleted | Status::Archived => &[],
    }
  }

  pub fn is_terminal(self) -> bool {
    self.transitions().is_empty()
  }

  /// Wire value, as used in query parameters and PATCH bodies.
  pub fn as_str(self) -> &'static str {
    match self {
      Status::Draft => "DRAFT",
      Status::Pending => "PENDING",
      Status::Active => "ACTIVE",
      Status::Rejected => "REJECTED",
      Status::Deleted => "DELETED",
      Status::Archived => "ARCHIVED",
    }
  }

  /// Display label for table cells and picker entries.
  pub fn label(self) -> &'static str {
    match self {
      Status::Draft => "Draft",
      Status::Pending => "Pending",
      Status::Active => "Active",
      Status::Rejected => "Rejected",
      Status::Deleted => "Deleted",
      Status::Archived => "Archived",
    }
  }

  /// Parse the wire value. Unknown values are rejected rather than
  /// defaulted so a bad filter string never silently widens a query.
  pub fn parse(s: &str) -> Option<Status> {
    match s {
      "DRAFT" => Some(Status::Draft),
      "PENDING" => Some(Status::Pending),
      "ACTIVE" => Some(Status::Active),
      "REJECTED" => Some(Status::Rejected),
      "DELETED" => Some(Status::Deleted),
      "ARCHIVED" => Some(Status::Archived),
      _ => None,
    }
  }

  pub const ALL: &'static [Status] = &[
    Status::Draft,
    Status::Pending,
    Status::Active,
    Status::Rejected,
    Status::Deleted,
    Status::Archived,
  ];
}

/// A residence row as served by the list and detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Residence {
  pub id: String,
  pub name: String,
  pub status: Status,
  #[serde(default)]
  pub brand: Option<String>,
  #[serde(default)]
  pub city_id: Option<String>,
  #[serde(default)]
  pub city_name: Option<String>,
  #[serde(default)]
  pub units: Option<u32>,
  pub updated_at: DateTime<Utc>,
}

/// Body for `POST /residences` and `PUT /residences/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidencePayload {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub brand: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub city_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub units: Option<u32>,
}

impl ResidencePayload {
  /// Payload that preserves every field of `residence` except the name.
  pub fn rename(residence: &Residence, name: String) -> Self {
    Self {
      name,
      brand: residence.brand.clone(),
      city_id: residence.city_id.clone(),
      units: residence.units,
    }
  }
}

/// A guest review attached to a residence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  pub id: String,
  pub residence_id: String,
  #[serde(default)]
  pub residence_name: Option<String>,
  pub author: String,
  pub rating: u8,
  pub status: Status,
  #[serde(default)]
  pub excerpt: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Reference data: a city residences can be filtered by.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub country: Option<String>,
}

/// Media kinds accepted by `POST /media?type=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
  ResidenceGallery,
  ResidenceFloorplan,
  BrandLogo,
}

impl MediaType {
  pub fn as_str(self) -> &'static str {
    match self {
      MediaType::ResidenceGallery => "RESIDENCE_GALLERY",
      MediaType::ResidenceFloorplan => "RESIDENCE_FLOORPLAN",
      MediaType::BrandLogo => "BRAND_LOGO",
    }
  }
}

/// Upload result: `{ data: { id, url } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Media {
  pub id: String,
  pub url: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_draft_only_moves_to_pending() {
    assert_eq!(Status::Draft.transitions(), &[Status::Pending]);
  }

  #[test]
  fn test_pending_fan_out() {
    let targets = Status::Pending.transitions();
    assert!(targets.contains(&Status::Active));
    assert!(targets.contains(&Status::Rejected));
    assert!(targets.contains(&Status::Deleted));
  }

  #[test]
  fn test_terminal_statuses() {
    assert!(Status::Deleted.is_terminal());
    assert!(Status::Archived.is_terminal());
    assert!(Status::Rejected.is_terminal());
    assert!(!Status::Active.is_terminal());
  }

  #[test]
  fn test_status_wire_format() {
    let json = serde_json::to_string(&Status::Active).unwrap();
    assert_eq!(json, "\"ACTIVE\"");
    let parsed: Status = serde_json::from_str("\"PENDING\"").unwrap();
    assert_eq!(parsed, Status::Pending);
  }

  #[test]
  fn test_residence_deserializes_camel_case() {
    let body = r#"{
      "id": "res-1",
      "name": "The Atelier",
      "status": "ACTIVE",
      "cityId": "c-1",
      "cityName": "Lisbon",
      "units": 24,
      "updatedAt": "2025-05-01T09:30:00Z"
    }"#;

    let residence: Residence = serde_json::from_str(body).unwrap();
    assert_eq!(residence.name, "The Atelier");
    assert_eq!(residence.status, Status::Active);
    assert_eq!(residence.city_name.as_deref(), Some("Lisbon"));
    assert!(residence.brand.is_none());
  }

  #[test]
  fn test_rename_payload_preserves_other_fields() {
    let residence: Residence = serde_json::from_str(
      r#"{
        "id": "res-1",
        "name": "Old",
        "status": "DRAFT",
        "brand": "Aman",
        "units": 12,
        "updatedAt": "2025-05-01T09:30:00Z"
      }"#,
    )
    .unwrap();

    let payload = ResidencePayload::rename(&residence, "New".to_string());
    assert_eq!(payload.name, "New");
    assert_eq!(payload.brand.as_deref(), Some("Aman"));
    assert_eq!(payload.units, Some(12));
  }
}
