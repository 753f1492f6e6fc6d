//! Agent backend abstraction
//!
//! Typed access to the `/chat`, `/action` and `/fact-check` endpoints.

mod error;
mod http;
mod types;

pub use error::{AgentError, AgentErrorKind};
pub use http::HttpAgentService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Common interface for the agent backend
#[async_trait]
pub trait AgentService: Send + Sync {
    /// `POST /chat`
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;

    /// `POST /action`
    async fn action(&self, request: &ActionRequest) -> Result<ActionResponse, AgentError>;

    /// `POST /fact-check`
    async fn fact_check(&self, request: &FactCheckRequest) -> Result<FactCheckResult, AgentError>;

    /// Backend origin, for logs and the status line
    fn base_url(&self) -> &str;
}

#[async_trait]
impl<T: AgentService + ?Sized> AgentService for Arc<T> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        (**self).chat(request).await
    }

    async fn action(&self, request: &ActionRequest) -> Result<ActionResponse, AgentError> {
        (**self).action(request).await
    }

    async fn fact_check(&self, request: &FactCheckRequest) -> Result<FactCheckResult, AgentError> {
        (**self).fact_check(request).await
    }

    fn base_url(&self) -> &str {
        (**self).base_url()
    }
}

/// Logging wrapper for agent services
pub struct LoggingService<S> {
    inner: S,
}

impl<S: AgentService> LoggingService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    fn record<T>(&self, endpoint: &str, started: Instant, result: &Result<T, AgentError>) {
        let duration = started.elapsed();
        match result {
            Ok(_) => {
                tracing::info!(
                    endpoint,
                    base_url = %self.inner.base_url(),
                    duration_ms = %duration.as_millis(),
                    "Agent request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint,
                    base_url = %self.inner.base_url(),
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    detail = ?e.detail,
                    "Agent request failed"
                );
            }
        }
    }
}

#[async_trait]
impl<S: AgentService> AgentService for LoggingService<S> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let started = Instant::now();
        let result = self.inner.chat(request).await;
        self.record("/chat", started, &result);
        result
    }

    async fn action(&self, request: &ActionRequest) -> Result<ActionResponse, AgentError> {
        let started = Instant::now();
        let result = self.inner.action(request).await;
        self.record("/action", started, &result);
        result
    }

    async fn fact_check(&self, request: &FactCheckRequest) -> Result<FactCheckResult, AgentError> {
        let started = Instant::now();
        let result = self.inner.fact_check(request).await;
        self.record("/fact-check", started, &result);
        result
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}
