//! Request descriptors and the executor that turns them into HTTP calls.
//!
//! # Design
//! `RequestExecutor` captures the service-wide defaults once (base URL,
//! headers, query parameters) and applies them to every `RequestDescriptor`.
//! The three steps are public on their own: `build` produces an
//! `HttpRequest`, `parse` interprets an `HttpResponse`, and `execute` runs
//! build, transport and parse as a single attempt with no retries.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{NluError, ServiceError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

/// One call against the service, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
    /// Merged over the executor's default parameters; keys given here win.
    pub query: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attach a JSON body, serializing `payload` eagerly. A payload that
    /// serializes to `null` leaves the request without a body.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self, NluError> {
        let value = serde_json::to_value(payload).map_err(NluError::Serialization)?;
        self.body = (!value.is_null()).then_some(value);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Builds, sends and interprets requests against one service endpoint.
#[derive(Clone)]
pub struct RequestExecutor<T> {
    base_url: String,
    headers: Vec<(String, String)>,
    params: Vec<(String, String)>,
    transport: T,
}

impl<T> RequestExecutor<T> {
    pub fn new(
        base_url: &str,
        headers: Vec<(String, String)>,
        params: Vec<(String, String)>,
        transport: T,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
            params,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build(&self, descriptor: &RequestDescriptor) -> Result<HttpRequest, NluError> {
        let query = merge_params(&self.params, &descriptor.query);
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, descriptor.path), &query)?;
        let body = descriptor
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(NluError::Serialization)?;

        Ok(HttpRequest {
            method: descriptor.method,
            url: url.into(),
            headers: self.headers.clone(),
            body,
        })
    }

    /// Decode the body, then map any status other than 200 to
    /// `NluError::Service`.
    pub fn parse(&self, response: HttpResponse) -> Result<Value, NluError> {
        let data: Value =
            serde_json::from_str(&response.body).map_err(|source| NluError::Deserialization {
                status: response.status,
                source,
            })?;
        if response.status != 200 {
            return Err(ServiceError::from_response(response.status, &data).into());
        }
        Ok(data)
    }
}

impl<T: Transport> RequestExecutor<T> {
    pub fn execute(&self, descriptor: RequestDescriptor) -> Result<Value, NluError> {
        let result = self
            .build(&descriptor)
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| self.parse(response));

        match &result {
            Ok(_) => tracing::debug!(
                method = %descriptor.method,
                path = %descriptor.path,
                "NLU API request succeeded"
            ),
            Err(err) => tracing::error!(
                method = %descriptor.method,
                path = %descriptor.path,
                error = %err,
                "NLU API request failed"
            ),
        }
        result
    }
}

impl<T> fmt::Debug for RequestExecutor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.params.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("params", &params)
            .finish_non_exhaustive()
    }
}

/// Defaults first, in their original order. An override replaces the
/// default's value in place; keys the defaults lack are appended.
fn merge_params(
    defaults: &[(String, String)],
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged = defaults.to_vec();
    for (key, value) in overrides {
        match merged.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value.clone(),
            None => merged.push((key.clone(), value.clone())),
        }
    }
    merged
}
