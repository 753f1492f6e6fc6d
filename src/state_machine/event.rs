//! Events that drive the client

use super::state::{FactCheckField, RequestId};
use crate::agent::{ActionKind, ActionResponse, AgentError, ChatResponse, FactCheckResult};
use crate::attachment::ImageAttachment;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Navigation
    Start,
    NavigateFactChecker,
    BackToChat,

    // Chat gestures
    SubmitQuery {
        text: String,
        image: Option<ImageAttachment>,
    },
    RunAction {
        action: ActionKind,
    },
    /// A suggested question was picked; behaves like submitting it
    SelectSuggestion {
        question: String,
    },

    // Fact-checker gestures
    FactCheckInput {
        field: FactCheckField,
        value: String,
    },
    SubmitFactCheck,
    ClearFactCheck,

    // Transport completions
    ChatCompleted {
        request_id: RequestId,
        outcome: Result<ChatResponse, AgentError>,
    },
    ActionCompleted {
        request_id: RequestId,
        action: ActionKind,
        outcome: Result<ActionResponse, AgentError>,
    },
    FactCheckCompleted {
        request_id: RequestId,
        outcome: Result<FactCheckResult, AgentError>,
    },
}

impl Event {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::NavigateFactChecker => "navigate_fact_checker",
            Event::BackToChat => "back_to_chat",
            Event::SubmitQuery { .. } => "submit_query",
            Event::RunAction { .. } => "run_action",
            Event::SelectSuggestion { .. } => "select_suggestion",
            Event::FactCheckInput { .. } => "fact_check_input",
            Event::SubmitFactCheck => "submit_fact_check",
            Event::ClearFactCheck => "clear_fact_check",
            Event::ChatCompleted { .. } => "chat_completed",
            Event::ActionCompleted { .. } => "action_completed",
            Event::FactCheckCompleted { .. } => "fact_check_completed",
        }
    }
}
