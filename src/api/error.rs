//! Error types for the Residia API client.

/// Errors raised by API requests.
///
/// Every call is a single attempt; there is no retry or backoff. Callers
/// surface these as a toast and abort the operation that triggered them.
#[derive(thiserror::Error, Debug)]
pub enum Error {
  /// The request could not be sent or the response body could not be read.
  #[error("request failed: {0}")]
  Request(String),
  /// The API answered with a non-2xx status.
  #[error("{method} {path} returned {status}")]
  Status {
    method: &'static str,
    path: String,
    status: u16,
    /// Server-provided message from the envelope, if the body had one.
    message: Option<String>,
  },
  /// The response body did not match the expected envelope.
  #[error("unexpected response body: {0}")]
  Decode(String),
}

impl Error {
  /// Short human-readable form for toasts.
  pub fn toast_message(&self) -> String {
    match self {
      Error::Request(msg) => format!("Network error: {}", msg),
      Error::Status {
        status,
        message: Some(msg),
        ..
      } => format!("Server error {}: {}", status, msg),
      Error::Status { status, path, .. } => format!("Server error {} on {}", status, path),
      Error::Decode(msg) => format!("Bad response: {}", msg),
    }
  }
}
