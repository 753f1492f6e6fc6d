//! HTTP implementation of the agent service

use super::{
    ActionRequest, ActionResponse, AgentError, AgentService, ChatRequest, ChatResponse,
    FactCheckRequest, FactCheckResult,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// JSON-over-HTTP client for a fixed backend origin
pub struct HttpAgentService {
    client: Client,
    base_url: String,
}

impl HttpAgentService {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, AgentError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Sending agent request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    AgentError::connection(format!("Connection failed: {e}"))
                } else {
                    AgentError::connection(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::connection(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(AgentError::from_status(status.as_u16(), &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| AgentError::malformed(format!("Unexpected response from {path}: {e}")))
    }
}

#[async_trait]
impl AgentService for HttpAgentService {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.post_json("/chat", request).await
    }

    async fn action(&self, request: &ActionRequest) -> Result<ActionResponse, AgentError> {
        self.post_json("/action", request).await
    }

    async fn fact_check(&self, request: &FactCheckRequest) -> Result<FactCheckResult, AgentError> {
        self.post_json("/fact-check", request).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
