use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One header of an execution request or response.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Result of running a function once.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Execution {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    #[serde(rename = "$updatedAt")]
    pub updated_at: String,
    #[serde(rename = "$permissions")]
    pub permissions: Vec<String>,
    pub function_id: String,
    /// `http`, `schedule` or `event`.
    pub trigger: String,
    /// `waiting`, `processing`, `completed` or `failed`.
    pub status: String,
    pub request_method: String,
    pub request_path: String,
    pub request_headers: Vec<Header>,
    pub response_status_code: u16,
    pub response_body: String,
    pub response_headers: Vec<Header>,
    pub logs: String,
    pub errors: String,
    /// Seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExecutionList {
    pub total: u64,
    pub executions: Vec<Execution>,
}

/// Optional parts of [`super::Functions::create_execution`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Return immediately with a `waiting` execution instead of the finished one.
    #[serde(rename = "async", skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl ExecutionRequest {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Default::default()
        }
    }
}
