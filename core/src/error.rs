//! Error types for the NLU client.
//!
//! # Design
//! Non-200 responses become `ServiceError`, which keeps the service's
//! `error`, `code` and `body` fields apart instead of collapsing them into a
//! single string. Everything else (transport, URL, JSON) is propagated with
//! its original source attached.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `RequestExecutor` and `NluClient`.
#[derive(Debug, Error)]
pub enum NluError {
    /// The service answered with a status other than 200.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The request never produced a response (DNS, refused connection, IO).
    #[error("transport failure: {0}")]
    Transport(#[from] ureq::Error),

    /// Endpoint plus path did not form a valid URL.
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body was not valid JSON.
    #[error("deserialization of HTTP {status} response failed: {source}")]
    Deserialization {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing configuration value `{0}`")]
    MissingConfig(&'static str),

    #[error("invalid configuration value for `{key}`: {value:?}")]
    InvalidConfig { key: &'static str, value: String },
}

/// A non-200 answer from the NLU service.
///
/// The service reports failures with up to three fields: `error` (a message
/// or a numeric code depending on the route), `code`, and `body` (a human
/// readable description). All three are kept as returned.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceError {
    pub status: u16,
    pub error: Option<Value>,
    pub code: Option<Value>,
    pub body: Option<Value>,
}

impl ServiceError {
    /// Extract the error fields from a decoded response body.
    pub fn from_response(status: u16, data: &Value) -> Self {
        let field = |name: &str| data.get(name).filter(|v| !v.is_null()).cloned();
        Self {
            status,
            error: field("error"),
            code: field("code"),
            body: field("body"),
        }
    }

    /// The `error` field when truthy, otherwise `body`, otherwise the status.
    pub fn message(&self) -> String {
        self.error
            .as_ref()
            .filter(|v| is_truthy(v))
            .or(self.body.as_ref().filter(|v| is_truthy(v)))
            .map(render)
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NLU service returned HTTP {}: {}", self.status, self.message())?;
        if let Some(code) = &self.code {
            write!(f, " (code {})", render(code))?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
