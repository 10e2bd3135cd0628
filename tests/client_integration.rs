use r9s::api::query::{ListQuery, SortOrder};
use r9s::api::types::{MediaType, ResidencePayload, Status};
use r9s::api::{CachedClient, Client, Error};
use r9s::cache::SqliteStorage;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
  std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[tokio::test]
async fn list_residences_success() {
  let mock_server = MockServer::start().await;
  let body = load_fixture("residences.json");

  Mock::given(method("GET"))
    .and(path("/api/v1/residences"))
    .respond_with(ResponseTemplate::new(200).set_body_string(&body))
    .mount(&mock_server)
    .await;

  let client = Client::with_base_url(&mock_server.uri());
  let page = client.list_residences(&ListQuery::default()).await.unwrap();

  assert_eq!(page.items.len(), 3);
  assert_eq!(page.items[0].name, "The Atelier");
  assert_eq!(page.items[0].status, Status::Active);
  assert_eq!(page.pagination.page, 1);
  assert_eq!(page.pagination.total_pages, 3);
  assert!(page.pagination.has_next());
}

#[tokio::test]
async fn list_residences_serializes_filters_as_repeated_params() {
  let mock_server = MockServer::start().await;
  let body = load_fixture("residences.json");

  Mock::given(method("GET"))
    .and(path("/api/v1/residences"))
    .respond_with(ResponseTemplate::new(200).set_body_string(&body))
    .mount(&mock_server)
    .await;

  let client = Client::with_base_url(&mock_server.uri());
  let query = ListQuery::default()
    .with_page(2)
    .with_limit(10)
    .with_query("marina")
    .with_statuses([Status::Active, Status::Pending])
    .with_city_ids(["c-1".to_string()])
    .with_sort("updatedAt", SortOrder::Desc);
  client.list_residences(&query).await.unwrap();

  let requests = mock_server.received_requests().await.unwrap();
  let sent = requests[0].url.query().unwrap();
  assert_eq!(
    sent,
    "page=2&limit=10&query=marina&status=ACTIVE&status=PENDING&cityId=c-1&sort=updatedAt&order=desc"
  );
}

#[tokio::test]
async fn list_residences_server_error_is_typed() {
  let mock_server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/v1/residences"))
    .respond_with(ResponseTemplate::new(503).set_body_string(
      r#"{ "data": null, "statusCode": 503, "message": "maintenance window" }"#,
    ))
    .mount(&mock_server)
    .await;

  let client = Client::with_base_url(&mock_server.uri());
  let result = client.list_residences(&ListQuery::default()).await;

  match result {
    Err(Error::Status {
      status, message, ..
    }) => {
      assert_eq!(status, 503);
      assert_eq!(message.as_deref(), Some("maintenance window"));
    }
    other => panic!("expected status error, got {:?}", other.map(|p| p.items.len())),
  }
}

#[tokio::test]
async fn list_residences_malformed_body_is_decode_error() {
  let mock_server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/v1/residences"))
    .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
    .mount(&mock_server)
    .await;

  let client = Client::with_base_url(&mock_server.uri());
  let result = client.list_residences(&ListQuery::default()).await;
  assert!(matches!(result, Err(Error::Decode(_))));
}

#[tokio::test]
async fn list_residences_without_pagination_is_rejected() {
  let mock_server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/v1/residences"))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_string(r#"{ "data": [], "statusCode": 200 }"#),
    )
    .mount(&mock_server)
    .await;

  let client = Client::with_base_url(&mock_server.uri());
  let result = client.list_residences(&ListQuery::default()).await;
  assert!(matches!(result, Err(Error::Decode(_))));
}

#[tokio::test]
async fn get_residence_success() {
  let mock_server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/v1/residences/res-1"))
    .respond_with(ResponseTemplate::new(200).set_body_string(
      r#"{
        "data": {
        "id": "res-1",
        "name": "The Atelier",
        "status": "ACTIVE",
        "updatedAt": "2025-05-01T09:30:00Z"
        },
        "statusCode": 200
      }"#,
    ))
    .mount(&mock_server)
    .await;

  let client = Client::with_base_url(&mock_server.uri());
  let residence = client.get_residence("res-1").await.unwrap();
  assert_eq!(residence.name, "The Atelier");
}

#[tokio::test]
async fn create_residence_posts_payload_without_absent_fields() {
  let mock_server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/api/v1/residences"))
    .respond_with(ResponseTemplate::new(201).set_body_string(
      r#"{
        "data": {
        "id": "res-new",
        "name": "Casa Norte",
        "status": "DRAFT",
        "updatedAt": "2025-06-01T12:00:00Z"
        },
        "statusCode": 201
      }"#,
    ))
    .mount(&mock_server)
    .await;

  let client = Client::with_base_url(&mock_server.uri());
  let payload = ResidencePayload {
    name: "Casa Norte".to_string(),
    brand: None,
    city_id: Some("c-2".to_string()),
    units: None,
  };
  let created = client.create_residence(&payload).await.unwrap();
  assert_eq!(created.id, "res-new");
  assert_eq!(created.status, Status::Draft);

  // Absent optionals must not appear in the body at all
  let requests = mock_server.received_requests().await.unwrap();
  let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
  assert_eq!(
    sent,
    serde_json::json!({ "name": "Casa Norte", "cityId": "c-2" })
  );
}

#[tokio::test]
async fn update_status_sends_patch_with_wire_value() {
  let mock_server = MockServer::start().await;

  Mock::given(method("PATCH"))
    .and(path("/api/v1/residences/res-1/status"))
    .respond_with(
      ResponseTemplate::new(200).set_body_string(r#"{ "data": null, "statusCode": 200 }"#),
    )
    .mount(&mock_server)
    .await;

  let client = Client::with_base_url(&mock_server.uri());
  client
    .update_residence_status("res-1", Status::Archived)
    .await
    .unwrap();

  let requests = mock_server.received_requests().await.unwrap();
  let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
  assert_eq!(sent, serde_json::json!({ "status": "ARCHIVED" }));
}

#[tokio::test]
async fn delete_residence_issues_delete() {
  let mock_server = MockServer::start().await;

  Mock::given(method("DELETE"))
    .and(path("/api/v1/residences/res-9"))
    .respond_with(
      ResponseTemplate::new(200).set_body_string(r#"{ "data": null, "statusCode": 200 }"#),
    )
    .expect(1)
    .mount(&mock_server)
    .await;

  let client = Client::with_base_url(&mock_server.uri());
  client.delete_residence("res-9").await.unwrap();
}

#[tokio::test]
async fn upload_media_is_multipart_with_type_param() {
  let mock_server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/api/v1/media"))
    .respond_with(ResponseTemplate::new(201).set_body_string(
      r#"{ "data": { "id": "m-1", "url": "https://cdn.example/m-1.jpg" }, "statusCode": 201 }"#,
    ))
    .mount(&mock_server)
    .await;

  let client = Client::with_base_url(&mock_server.uri());
  let media = client
    .upload_media(
      MediaType::ResidenceGallery,
      "facade.jpg",
      vec![0xFF, 0xD8, 0xFF],
    )
    .await
    .unwrap();

  assert_eq!(media.id, "m-1");
  assert_eq!(media.url, "https://cdn.example/m-1.jpg");

  let requests = mock_server.received_requests().await.unwrap();
  assert_eq!(requests[0].url.query(), Some("type=RESIDENCE_GALLERY"));
  let content_type = requests[0]
    .headers
    .get("content-type")
    .and_then(|value| value.to_str().ok())
    .unwrap_or_default();
  assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn cities_are_served_from_cache_on_second_call() {
  let mock_server = MockServer::start().await;
  let body = load_fixture("cities.json");

  // A second network hit would trip the expectation when the server
  // verifies on drop.
  Mock::given(method("GET"))
    .and(path("/api/v1/cities"))
    .respond_with(ResponseTemplate::new(200).set_body_string(&body))
    .expect(1)
    .mount(&mock_server)
    .await;

  let client = Client::with_base_url(&mock_server.uri());
  let api = CachedClient::with_storage(client, SqliteStorage::open_in_memory().unwrap());

  let first = api.cities().await.unwrap();
  let second = api.cities().await.unwrap();

  assert_eq!(first.len(), 3);
  assert_eq!(second.len(), 3);
  assert_eq!(second[0].name, "Lisbon");
}
