//! Request payloads and resource names used by `NluClient`.
//!
//! Response bodies are passed through as `serde_json::Value`; their shape is
//! owned by the service.

use serde::Serialize;

/// Body of a `/parse` call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ParseQuery<'a> {
    pub q: &'a str,
    pub project: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
}

/// Read-only sub-resources exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Available projects and their models.
    Status,
    Version,
    Config,
}

impl AsRef<str> for Resource {
    fn as_ref(&self) -> &str {
        match self {
            Resource::Status => "status",
            Resource::Version => "version",
            Resource::Config => "config",
        }
    }
}
