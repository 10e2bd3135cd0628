//! Client for the Residia back-office REST API.

mod cache;
mod cached_client;
mod client;
mod envelope;
mod error;
pub mod query;
pub mod types;

pub use cached_client::CachedClient;
pub use client::Client;
pub use envelope::{Envelope, Page, Pagination};
pub use error::Error;
