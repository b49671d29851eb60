//! Blocking client for an NLU (natural-language-understanding) service's
//! REST API.
//!
//! # Overview
//! `NluClient` exposes `train`, `evaluate`, `parse`, `get` and `delete`.
//! Each one is a single HTTP call: project and token travel as query
//! parameters, payloads as JSON, and a 200 response comes back as the
//! decoded `serde_json::Value`. Any other status becomes
//! `NluError::Service` carrying the service's `error`, `code` and `body`.
//!
//! # Design
//! - `RequestExecutor` splits a call into `build` (descriptor to
//!   `HttpRequest`), a `Transport` round-trip, and `parse` (`HttpResponse`
//!   to JSON or error), so everything but the network is testable as data.
//! - `UreqTransport` is the default transport; tests plug in their own.
//! - No retries and no shared mutable state: calls are independent.
//! - Failures are logged through `tracing`; installing a subscriber is left
//!   to the application.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;
pub mod types;

pub use client::NluClient;
pub use config::NluConfig;
pub use error::{NluError, ServiceError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::{RequestDescriptor, RequestExecutor};
pub use transport::{Transport, UreqTransport};
pub use types::{ParseQuery, Resource};
