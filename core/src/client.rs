//! Named operations over the NLU service's HTTP API.
//!
//! # Design
//! `NluClient` holds nothing but a configured `RequestExecutor` and the
//! project name it needs for `/parse` bodies. Project and token are baked
//! into the executor's default query parameters at construction; neither is
//! readable back from the client and `Debug` does not print them.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::config::NluConfig;
use crate::error::NluError;
use crate::request::{RequestDescriptor, RequestExecutor};
use crate::transport::{Transport, UreqTransport};
use crate::types::ParseQuery;

/// Client for one project on one NLU service endpoint.
///
/// Every operation is a single blocking HTTP call. A 200 response returns
/// the decoded JSON body as-is; anything else is an `NluError`.
#[derive(Clone)]
pub struct NluClient<T = UreqTransport> {
    executor: RequestExecutor<T>,
    project: String,
}

impl NluClient<UreqTransport> {
    pub fn new(endpoint: &str, project: &str, token: &str) -> Self {
        Self::with_transport(endpoint, project, token, UreqTransport::new())
    }

    pub fn from_config(config: &NluConfig) -> Self {
        Self::with_transport(
            &config.endpoint,
            &config.project,
            &config.token,
            UreqTransport::with_timeout(config.timeout()),
        )
    }
}

impl<T: Transport> NluClient<T> {
    pub fn with_transport(endpoint: &str, project: &str, token: &str, transport: T) -> Self {
        let headers = vec![("content-type".to_string(), "application/json".to_string())];
        let params = vec![
            ("project".to_string(), project.to_string()),
            ("token".to_string(), token.to_string()),
        ];
        Self {
            executor: RequestExecutor::new(endpoint, headers, params, transport),
            project: project.to_string(),
        }
    }

    /// Train a model from `training_data`. The service answers with
    /// `{"info", "model"}` where `model` names the new model.
    pub fn train<D: Serialize + ?Sized>(&self, training_data: &D) -> Result<Value, NluError> {
        self.request(RequestDescriptor::post("/train").json(training_data)?)
    }

    /// Evaluate the project's model against `test_data`.
    pub fn evaluate<D: Serialize + ?Sized>(&self, test_data: &D) -> Result<Value, NluError> {
        self.request(RequestDescriptor::post("/evaluate").json(test_data)?)
    }

    /// Extract intent and entities from `text`.
    pub fn parse(&self, text: &str) -> Result<Value, NluError> {
        self.parse_query(text, None)
    }

    /// `parse`, answered by the named model instead of the project default.
    pub fn parse_with_model(&self, text: &str, model: &str) -> Result<Value, NluError> {
        self.parse_query(text, Some(model))
    }

    fn parse_query(&self, text: &str, model: Option<&str>) -> Result<Value, NluError> {
        let query = ParseQuery {
            q: text,
            project: &self.project,
            model,
        };
        self.request(RequestDescriptor::post("/parse").json(&query)?)
    }

    /// Fetch a read-only sub-resource such as `status`, `version` or `config`.
    pub fn get(&self, resource: impl AsRef<str>) -> Result<Value, NluError> {
        let resource = resource.as_ref().trim_start_matches('/');
        self.request(RequestDescriptor::get(format!("/{resource}")))
    }

    pub fn delete(&self, model_id: &str) -> Result<Value, NluError> {
        self.request(RequestDescriptor::delete("/models").query("model", model_id))
    }

    /// Run an arbitrary call with this client's defaults applied.
    pub fn request(&self, descriptor: RequestDescriptor) -> Result<Value, NluError> {
        self.executor.execute(descriptor)
    }
}

impl<T> fmt::Debug for NluClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NluClient")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}
