//! Client state types

use crate::agent::{FactCheckRequest, FactCheckResult};
use std::fmt;
use thiserror::Error;

/// Greeting shown as the first message of every conversation
pub const WELCOME_TEXT: &str = "**Welcome aboard the Cosmic Quest!** 🚀\n\n\
I'm your AI navigator, ready to guide you through the infinite expanse of space and \
knowledge. Whether you're curious about distant galaxies, the mysteries of black holes, \
stellar formations, or want to analyze celestial images, let's embark on this cosmic \
adventure together.\n\n*What corner of the universe shall we explore first?*";

/// Lead-in text of a suggestion message
pub const SUGGESTIONS_INTRO: &str =
    "Here are some stellar destinations for your next cosmic adventure:";

const WELCOME_ID: &str = "welcome-msg";

// ============================================================================
// Identifiers
// ============================================================================

/// Unique message id within a conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correlates a transport completion with the request that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Agent,
}

/// One entry of the conversation log
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: Option<String>,
    /// Image attached by the user
    pub image: Option<String>,
    /// Image URLs returned by the agent
    pub images: Vec<String>,
    pub suggestions: Option<Vec<String>>,
    pub fact_check: Option<FactCheckResult>,
    /// Whether follow-up actions are offered for this message
    pub is_actionable: bool,
}

impl Message {
    fn agent(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            sender: Sender::Agent,
            text: Some(text.into()),
            image: None,
            images: Vec::new(),
            suggestions: None,
            fact_check: None,
            is_actionable: false,
        }
    }
}

/// Input rejected before any request is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a query or select an image.")]
    EmptyQuery,
    #[error("Please provide both a query and an answer to fact-check.")]
    IncompleteFactCheck,
}

// ============================================================================
// Conversation State
// ============================================================================

/// Message log plus request lifecycle of the chat screen
///
/// The log is append-only; all mutation goes through the methods below.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    messages: Vec<Message>,
    in_flight: Option<RequestId>,
    error: Option<String>,
    last_topic: String,
    next_seq: u64,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    /// New conversation holding only the welcome message
    pub fn new() -> Self {
        Self {
            messages: vec![Message::agent(MessageId(WELCOME_ID.to_string()), WELCOME_TEXT)],
            in_flight: None,
            error: None,
            last_topic: String::new(),
            next_seq: 1,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_topic(&self) -> &str {
        &self.last_topic
    }

    /// Most recent message offering follow-up actions
    pub fn latest_actionable(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_actionable)
    }

    /// Suggestions of the most recent suggestion message
    pub fn latest_suggestions(&self) -> Option<&[String]> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| m.suggestions.as_deref())
    }

    fn next_id(&mut self, prefix: &str) -> MessageId {
        let id = MessageId(format!("{prefix}-{}", self.next_seq));
        self.next_seq += 1;
        id
    }

    /// Append the user's query. At least one of `text` and `image` must be
    /// non-empty; on failure nothing changes.
    pub fn append_user_message(
        &mut self,
        text: &str,
        image: Option<String>,
    ) -> Result<MessageId, ValidationError> {
        let text = text.trim();
        let image = image.filter(|url| !url.is_empty());
        if text.is_empty() && image.is_none() {
            return Err(ValidationError::EmptyQuery);
        }

        let id = self.next_id("user");
        self.messages.push(Message {
            id: id.clone(),
            sender: Sender::User,
            text: (!text.is_empty()).then(|| text.to_string()),
            image,
            images: Vec::new(),
            suggestions: None,
            fact_check: None,
            is_actionable: false,
        });
        if !text.is_empty() {
            self.last_topic = text.to_string();
        }
        Ok(id)
    }

    /// Append an agent answer
    pub fn append_agent_message(
        &mut self,
        text: impl Into<String>,
        images: Vec<String>,
        is_actionable: bool,
        fact_check: Option<FactCheckResult>,
    ) -> MessageId {
        let id = self.next_id("agent");
        let mut message = Message::agent(id.clone(), text);
        message.images = images;
        message.is_actionable = is_actionable;
        message.fact_check = fact_check;
        self.messages.push(message);
        id
    }

    /// Append suggested follow-up questions. Never actionable, so actions
    /// cannot chain off their own replies.
    pub fn append_agent_suggestions(&mut self, suggestions: Vec<String>) -> MessageId {
        let id = self.next_id("agent");
        let mut message = Message::agent(id.clone(), SUGGESTIONS_INTRO);
        message.suggestions = Some(suggestions);
        self.messages.push(message);
        id
    }

    pub fn begin_request(&mut self, request_id: RequestId) {
        self.in_flight = Some(request_id);
        self.error = None;
    }

    pub fn end_request(&mut self) {
        self.in_flight = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

// ============================================================================
// Fact-Check State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactCheckField {
    OriginalQuery,
    AnswerToCheck,
}

/// State of the fact-checker screen, independent of the conversation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactCheckState {
    original_query: String,
    answer_to_check: String,
    result: Option<FactCheckResult>,
    in_flight: Option<RequestId>,
    error: Option<String>,
}

impl FactCheckState {
    pub fn original_query(&self) -> &str {
        &self.original_query
    }

    pub fn answer_to_check(&self) -> &str {
        &self.answer_to_check
    }

    pub fn result(&self) -> Option<&FactCheckResult> {
        self.result.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_input(&mut self, field: FactCheckField, value: String) {
        match field {
            FactCheckField::OriginalQuery => self.original_query = value,
            FactCheckField::AnswerToCheck => self.answer_to_check = value,
        }
    }

    /// Build the request body if both inputs are non-blank
    pub fn request(&self) -> Result<FactCheckRequest, ValidationError> {
        if self.original_query.trim().is_empty() || self.answer_to_check.trim().is_empty() {
            return Err(ValidationError::IncompleteFactCheck);
        }
        Ok(FactCheckRequest {
            original_query: self.original_query.clone(),
            answer_to_check: self.answer_to_check.clone(),
        })
    }

    /// Start a check; clears the previous result and error
    pub fn begin_request(&mut self, request_id: RequestId) {
        self.in_flight = Some(request_id);
        self.error = None;
        self.result = None;
    }

    pub fn end_request(&mut self) {
        self.in_flight = None;
    }

    pub fn complete(&mut self, result: FactCheckResult) {
        self.result = Some(result);
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Reset inputs, result and error together
    pub fn clear_form(&mut self) {
        self.original_query.clear();
        self.answer_to_check.clear();
        self.result = None;
        self.error = None;
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Screen currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Landing,
    Chat,
    FactChecker,
}

/// Everything the client knows; owned by the runtime, borrowed by the UI
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub(super) view: View,
    pub(super) chat: ConversationState,
    pub(super) fact_check: FactCheckState,
    pub(super) next_request_id: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn chat(&self) -> &ConversationState {
        &self.chat
    }

    pub fn fact_check(&self) -> &FactCheckState {
        &self.fact_check
    }

    pub(super) fn allocate_request_id(&mut self) -> RequestId {
        self.next_request_id += 1;
        RequestId(self.next_request_id)
    }
}
