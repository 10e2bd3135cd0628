//! HTTP client for the Residia back-office API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::envelope::{Envelope, Page};
use super::error::Error;
use super::query::ListQuery;
use super::types::{City, Media, MediaType, Residence, ResidencePayload, Review, Status};

const API_PREFIX: &str = "/api/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Residia back-office API.
///
/// Every request is a single attempt against `{base}/api/v1/...` and
/// expects the standard envelope. Non-2xx responses become
/// [`Error::Status`], carrying the envelope message when the body has one.
#[derive(Clone)]
pub struct Client {
  http: reqwest::Client,
  base_url: String,
}

impl Client {
  /// Creates a client for the given base URL, authenticating with a
  /// bearer token.
  pub fn new(base_url: &str, token: &str) -> Result<Self, Error> {
    let mut headers = reqwest::header::HeaderMap::new();
    let mut auth = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
      .map_err(|e| Error::Request(format!("invalid API token: {}", e)))?;
    auth.set_sensitive(true);
    headers.insert(reqwest::header::AUTHORIZATION, auth);

    Self::build(base_url, headers)
  }

  /// Creates an unauthenticated client. Used for testing with wiremock.
  pub fn with_base_url(base_url: &str) -> Self {
    Self::build(base_url, reqwest::header::HeaderMap::new())
      .expect("client construction without auth cannot fail")
  }

  fn build(base_url: &str, headers: reqwest::header::HeaderMap) -> Result<Self, Error> {
    let http = reqwest::Client::builder()
      .default_headers(headers)
      .timeout(REQUEST_TIMEOUT)
      .build()
      .map_err(|e| Error::Request(format!("failed to build HTTP client: {}", e)))?;

    Ok(Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url, Error> {
    Url::parse(&format!("{}{}{}", self.base_url, API_PREFIX, path)).map_err(|e| {
      tracing::error!("invalid URL for {}: {}", path, e);
      Error::Request(format!("invalid URL: {}", e))
    })
  }

  /// Sends the request and decodes the envelope, mapping non-2xx to a
  /// typed error. The caller owns surfacing; nothing here retries.
  async fn execute<T: DeserializeOwned>(
    &self,
    method: &'static str,
    path: String,
    request: reqwest::RequestBuilder,
  ) -> Result<Envelope<T>, Error> {
    let response = request.send().await.map_err(|e| {
      tracing::error!("{} {} failed: {}", method, path, e);
      Error::Request(e.to_string())
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
      tracing::error!("{} {}: failed to read body: {}", method, path, e);
      Error::Request(e.to_string())
    })?;

    if !status.is_success() {
      // The error envelope shape matches the success one; pull the
      // message out if the body parses.
      let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
        .ok()
        .and_then(|envelope| envelope.message);
      tracing::warn!("{} {} returned {}: {}", method, path, status, snippet(&body));
      return Err(Error::Status {
        method,
        path,
        status: status.as_u16(),
        message,
      });
    }

    serde_json::from_str::<Envelope<T>>(&body).map_err(|e| {
      tracing::error!("{} {}: bad envelope: {} | body: {}", method, path, e, snippet(&body));
      Error::Decode(e.to_string())
    })
  }

  async fn get_page<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &ListQuery,
  ) -> Result<Page<T>, Error> {
    let url = query.add_to_url(&self.endpoint(path)?);
    let envelope: Envelope<Vec<T>> = self
      .execute("GET", path.to_string(), self.http.get(url))
      .await?;

    let pagination = envelope
      .pagination
      .ok_or_else(|| Error::Decode(format!("missing pagination on {}", path)))?;

    Ok(Page {
      items: envelope.data,
      pagination,
    })
  }

  // --- residences ---

  pub async fn list_residences(&self, query: &ListQuery) -> Result<Page<Residence>, Error> {
    self.get_page("/residences", query).await
  }

  pub async fn get_residence(&self, id: &str) -> Result<Residence, Error> {
    let path = format!("/residences/{}", id);
    let url = self.endpoint(&path)?;
    let envelope: Envelope<Residence> = self.execute("GET", path, self.http.get(url)).await?;
    Ok(envelope.data)
  }

  pub async fn create_residence(&self, payload: &ResidencePayload) -> Result<Residence, Error> {
    let path = "/residences".to_string();
    let url = self.endpoint(&path)?;
    let envelope: Envelope<Residence> = self
      .execute("POST", path, self.http.post(url).json(payload))
      .await?;
    Ok(envelope.data)
  }

  pub async fn update_residence(
    &self,
    id: &str,
    payload: &ResidencePayload,
  ) -> Result<Residence, Error> {
    let path = format!("/residences/{}", id);
    let url = self.endpoint(&path)?;
    let envelope: Envelope<Residence> = self
      .execute("PUT", path, self.http.put(url).json(payload))
      .await?;
    Ok(envelope.data)
  }

  pub async fn update_residence_status(&self, id: &str, status: Status) -> Result<(), Error> {
    self
      .patch_status(format!("/residences/{}/status", id), status)
      .await
  }

  pub async fn delete_residence(&self, id: &str) -> Result<(), Error> {
    self.delete(format!("/residences/{}", id)).await
  }

  // --- reviews ---

  pub async fn list_reviews(&self, query: &ListQuery) -> Result<Page<Review>, Error> {
    self.get_page("/reviews", query).await
  }

  pub async fn update_review_status(&self, id: &str, status: Status) -> Result<(), Error> {
    self
      .patch_status(format!("/reviews/{}/status", id), status)
      .await
  }

  pub async fn delete_review(&self, id: &str) -> Result<(), Error> {
    self.delete(format!("/reviews/{}", id)).await
  }

  // --- reference data ---

  pub async fn list_cities(&self) -> Result<Vec<City>, Error> {
    let path = "/cities".to_string();
    let url = self.endpoint(&path)?;
    let envelope: Envelope<Vec<City>> = self.execute("GET", path, self.http.get(url)).await?;
    Ok(envelope.data)
  }

  // --- media ---

  /// Uploads a file as multipart form data: `POST /media?type=<ENUM>`.
  pub async fn upload_media(
    &self,
    media_type: MediaType,
    file_name: &str,
    bytes: Vec<u8>,
  ) -> Result<Media, Error> {
    let path = "/media".to_string();
    let mut url = self.endpoint(&path)?;
    url
      .query_pairs_mut()
      .append_pair("type", media_type.as_str());

    let part = reqwest::multipart::Part::bytes(bytes)
      .file_name(file_name.to_string())
      .mime_str("application/octet-stream")
      .map_err(|e| Error::Request(e.to_string()))?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let envelope: Envelope<Media> = self
      .execute("POST", path, self.http.post(url).multipart(form))
      .await?;
    Ok(envelope.data)
  }

  // --- shared mutation plumbing ---

  async fn patch_status(&self, path: String, status: Status) -> Result<(), Error> {
    let url = self.endpoint(&path)?;
    let body = StatusPatch {
      status: status.as_str(),
    };
    let _: Envelope<serde_json::Value> = self
      .execute("PATCH", path, self.http.patch(url).json(&body))
      .await?;
    Ok(())
  }

  async fn delete(&self, path: String) -> Result<(), Error> {
    let url = self.endpoint(&path)?;
    let _: Envelope<serde_json::Value> = self
      .execute("DELETE", path, self.http.delete(url))
      .await?;
    Ok(())
  }
}

#[derive(Serialize)]
struct StatusPatch {
  status: &'static str,
}

fn snippet(body: &str) -> String {
  const MAX: usize = 500;
  if body.len() <= MAX {
    body.to_string()
  } else {
    format!("{}...[truncated]", &body[..MAX])
  }
}
