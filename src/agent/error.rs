//! Agent transport error types

use serde_json::Value;
use thiserror::Error;

/// Transport-level failure with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AgentError {
    pub kind: AgentErrorKind,
    /// Transport-level description of the failure
    pub message: String,
    /// Human-readable `detail` supplied by the backend, if any
    pub detail: Option<String>,
    /// HTTP status for `Status` errors
    pub status: Option<u16>,
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentErrorKind {
    /// Connection refused, reset, DNS failure, unreadable body
    Connection,
    /// Non-2xx response
    Status,
    /// 2xx response whose body does not have the expected shape
    MalformedResponse,
    /// The selected image could not be read or encoded
    Attachment,
}

impl AgentError {
    pub fn new(kind: AgentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            status: None,
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Connection, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::MalformedResponse, message)
    }

    pub fn attachment(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Attachment, message)
    }

    /// Build a `Status` error from a non-2xx response body
    pub fn from_status(status: u16, body: &str) -> Self {
        Self {
            kind: AgentErrorKind::Status,
            message: format!("Request failed with status code {status}"),
            detail: extract_detail(body),
            status: Some(status),
        }
    }

    pub fn is_malformed(&self) -> bool {
        self.kind == AgentErrorKind::MalformedResponse
    }

    /// Message for display: server detail, then the transport description,
    /// then `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        [self.detail.as_deref(), Some(self.message.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// Message for display that ignores the transport description
    pub fn detail_or(&self, fallback: &str) -> String {
        self.detail
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Pull a human-readable `detail` out of an error body.
///
/// A string is used as-is; a list of validation objects is joined from their
/// `msg` fields.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    match parsed.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
