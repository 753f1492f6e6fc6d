//! Mock implementations for testing
//!
//! These mocks enable runtime testing without a backend.

use crate::agent::{
    ActionRequest, ActionResponse, AgentError, AgentService, ChatRequest, ChatResponse,
    FactCheckRequest, FactCheckResult,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Mock Agent Service
// ============================================================================

/// Mock agent that returns queued responses and records every request
#[derive(Default)]
pub struct MockAgentService {
    chat_responses: Mutex<VecDeque<Result<ChatResponse, AgentError>>>,
    action_responses: Mutex<VecDeque<Result<ActionResponse, AgentError>>>,
    fact_check_responses: Mutex<VecDeque<Result<FactCheckResult, AgentError>>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub action_requests: Mutex<Vec<ActionRequest>>,
    pub fact_check_requests: Mutex<Vec<FactCheckRequest>>,
}

#[allow(dead_code)]
impl MockAgentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_chat(&self, response: Result<ChatResponse, AgentError>) {
        self.chat_responses.lock().unwrap().push_back(response);
    }

    /// Queue a plain chat answer
    pub fn queue_answer(&self, answer: &str) {
        self.queue_chat(Ok(ChatResponse {
            answer: answer.to_string(),
            image_urls: vec![],
            fact_check: None,
        }));
    }

    pub fn queue_action(&self, response: Result<ActionResponse, AgentError>) {
        self.action_responses.lock().unwrap().push_back(response);
    }

    pub fn queue_fact_check(&self, response: Result<FactCheckResult, AgentError>) {
        self.fact_check_responses.lock().unwrap().push_back(response);
    }

    pub fn recorded_chats(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn recorded_actions(&self) -> Vec<ActionRequest> {
        self.action_requests.lock().unwrap().clone()
    }

    pub fn recorded_fact_checks(&self) -> Vec<FactCheckRequest> {
        self.fact_check_requests.lock().unwrap().clone()
    }

    /// Total number of requests received on any endpoint
    pub fn request_count(&self) -> usize {
        self.chat_requests.lock().unwrap().len()
            + self.action_requests.lock().unwrap().len()
            + self.fact_check_requests.lock().unwrap().len()
    }
}

fn unqueued() -> AgentError {
    AgentError::connection("No mock response queued")
}

#[async_trait]
impl AgentService for MockAgentService {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.chat_requests.lock().unwrap().push(request.clone());
        self.chat_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unqueued()))
    }

    async fn action(&self, request: &ActionRequest) -> Result<ActionResponse, AgentError> {
        self.action_requests.lock().unwrap().push(request.clone());
        self.action_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unqueued()))
    }

    async fn fact_check(&self, request: &FactCheckRequest) -> Result<FactCheckResult, AgentError> {
        self.fact_check_requests.lock().unwrap().push(request.clone());
        self.fact_check_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unqueued()))
    }

    fn base_url(&self) -> &str {
        "mock://agent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ActionKind;
    use crate::attachment::ImageAttachment;
    use crate::runtime::ConversationRuntime;
    use crate::state_machine::{Event, FactCheckField, RequestId, Sender, TransitionError, View};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use std::sync::Arc;

    fn runtime_in_chat(agent: &Arc<MockAgentService>) -> ConversationRuntime<Arc<MockAgentService>> {
        let mut rt = ConversationRuntime::new(Arc::clone(agent));
        rt.dispatch(Event::Start).unwrap();
        rt
    }

    fn submit(text: &str) -> Event {
        Event::SubmitQuery {
            text: text.to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_empty_submission_makes_no_request() {
        let agent = Arc::new(MockAgentService::new());
        let mut rt = runtime_in_chat(&agent);

        rt.dispatch(submit("")).unwrap();
        rt.settle().await;

        assert_eq!(agent.request_count(), 0);
        assert_eq!(rt.state().chat().messages().len(), 1);
        assert_eq!(
            rt.state().chat().error(),
            Some("Please enter a query or select an image.")
        );
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let agent = Arc::new(MockAgentService::new());
        agent.queue_answer("A nebula is...");
        let mut rt = runtime_in_chat(&agent);

        rt.dispatch(submit("What is a nebula?")).unwrap();
        assert!(rt.state().chat().is_pending());
        assert_eq!(
            rt.dispatch(submit("again")),
            Err(TransitionError::RequestPending)
        );

        rt.settle().await;

        let requests = agent.recorded_chats();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, "What is a nebula?");
        assert_eq!(requests[0].image_base64, None);

        let messages = rt.state().chat().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].sender, Sender::User);
        assert_eq!(messages[2].text.as_deref(), Some("A nebula is..."));
        assert!(messages[2].is_actionable);
        assert!(!rt.state().chat().is_pending());
    }

    #[tokio::test]
    async fn test_suggestions_then_selection() {
        let agent = Arc::new(MockAgentService::new());
        agent.queue_answer("They are dense.");
        agent.queue_action(Ok(ActionResponse {
            answer: None,
            questions: Some(vec!["Q1".to_string(), "Q2".to_string()]),
        }));
        agent.queue_answer("Answer to Q1");
        let mut rt = runtime_in_chat(&agent);

        rt.dispatch(submit("black holes")).unwrap();
        rt.settle().await;
        rt.dispatch(Event::RunAction {
            action: ActionKind::SuggestQuestions,
        })
        .unwrap();
        rt.settle().await;

        let actions = agent.recorded_actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, ActionKind::SuggestQuestions);
        assert_eq!(actions[0].topic, "black holes");
        assert_eq!(
            rt.state().chat().latest_suggestions(),
            Some(&["Q1".to_string(), "Q2".to_string()][..])
        );

        rt.dispatch(Event::SelectSuggestion {
            question: "Q1".to_string(),
        })
        .unwrap();
        rt.settle().await;

        let chats = agent.recorded_chats();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[1].query, "Q1");
        assert_eq!(rt.state().chat().last_topic(), "Q1");
        assert_eq!(
            rt.state().chat().messages().last().unwrap().text.as_deref(),
            Some("Answer to Q1")
        );
    }

    #[tokio::test]
    async fn test_fact_check_round_trip() {
        let agent = Arc::new(MockAgentService::new());
        agent.queue_fact_check(Ok(FactCheckResult {
            is_accurate: false,
            confidence_score: 0.42,
            verified_facts: vec![],
            issues_found: vec!["Mars has two moons".to_string()],
            recommendations: Some("Check a reference.".to_string()),
        }));
        let mut rt = runtime_in_chat(&agent);
        rt.dispatch(Event::NavigateFactChecker).unwrap();

        rt.dispatch(Event::FactCheckInput {
            field: FactCheckField::OriginalQuery,
            value: "How many moons does Mars have?".to_string(),
        })
        .unwrap();
        rt.dispatch(Event::FactCheckInput {
            field: FactCheckField::AnswerToCheck,
            value: "Three".to_string(),
        })
        .unwrap();
        rt.dispatch(Event::SubmitFactCheck).unwrap();
        rt.settle().await;

        let requests = agent.recorded_fact_checks();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].answer_to_check, "Three");

        let result = rt.state().fact_check().result().unwrap();
        assert!(!result.is_accurate);
        assert_eq!(result.confidence_percent(), "42.0%");
        assert_eq!(result.issues_found.len(), 1);
        assert_eq!(rt.state().view(), View::FactChecker);
    }

    #[tokio::test]
    async fn test_error_detail_is_shown_and_log_unchanged() {
        let agent = Arc::new(MockAgentService::new());
        agent.queue_chat(Err(AgentError::from_status(
            429,
            r#"{"detail":"rate limited"}"#,
        )));
        let mut rt = runtime_in_chat(&agent);

        rt.dispatch(submit("hello")).unwrap();
        let before = rt.state().chat().messages().to_vec();
        rt.settle().await;

        assert_eq!(rt.state().chat().error(), Some("rate limited"));
        assert_eq!(rt.state().chat().messages(), &before[..]);
        assert!(!rt.state().chat().is_pending());
    }

    #[tokio::test]
    async fn test_image_is_encoded_into_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("andromeda.png");
        let bytes = b"\x89PNG\r\n\x1a\nfake image bytes";
        std::fs::write(&path, bytes).unwrap();

        let agent = Arc::new(MockAgentService::new());
        agent.queue_answer("That is a galaxy.");
        let mut rt = runtime_in_chat(&agent);

        let image = ImageAttachment::from_path(&path).unwrap();
        rt.dispatch(Event::SubmitQuery {
            text: String::new(),
            image: Some(image),
        })
        .unwrap();
        rt.settle().await;

        let requests = agent.recorded_chats();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, "");
        assert_eq!(requests[0].image_base64, Some(BASE64.encode(bytes)));

        let user = &rt.state().chat().messages()[1];
        assert_eq!(user.text, None);
        assert!(user
            .image
            .as_deref()
            .is_some_and(|url| url.starts_with("file://") && url.ends_with("andromeda.png")));
    }

    #[tokio::test]
    async fn test_unreadable_image_fails_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.jpg");

        let agent = Arc::new(MockAgentService::new());
        let mut rt = runtime_in_chat(&agent);

        let image = ImageAttachment::from_path(&path).unwrap();
        rt.dispatch(Event::SubmitQuery {
            text: "what is this".to_string(),
            image: Some(image),
        })
        .unwrap();
        rt.settle().await;

        assert_eq!(agent.request_count(), 0);
        assert!(rt.state().chat().error().is_some());
        assert_eq!(rt.state().chat().messages().len(), 2);
        assert!(!rt.state().chat().is_pending());
    }

    #[tokio::test]
    async fn test_stale_completion_is_ignored() {
        let agent = Arc::new(MockAgentService::new());
        let mut rt = runtime_in_chat(&agent);
        let before = rt.state().clone();

        rt.handle_completion(Event::ChatCompleted {
            request_id: RequestId(99),
            outcome: Err(AgentError::connection("late")),
        });

        assert_eq!(rt.state(), &before);
    }
}
