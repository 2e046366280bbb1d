//! HTTP client abstraction for escrow relays
//!
//! This crate wraps `reqwest` so the relay client only sees typed JSON calls,
//! plain-text calls and a single [`HttpError`] type.
//!
//! # Example
//!
//! ```no_run
//! use escrow_http_client::{HttpClient, Response};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct JobStatus {
//!     status: String,
//! }
//!
//! async fn example() -> Response<JobStatus> {
//!     let client = HttpClient::new();
//!     client.fetch("http://localhost:3000/job_status/job-42").await
//! }
//! ```

mod client;
mod error;
mod response;

pub use client::{HttpClient, HttpClientBuilder};
pub use error::HttpError;
pub use response::Response;
