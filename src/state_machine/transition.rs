//! Pure state transition function
//!
//! Given the same state and event this always produces the same new state and
//! effects; transport calls happen only when the runtime executes the effects.

use super::state::{AppState, RequestId, View};
use super::{Effect, Event};
use crate::agent::{ActionKind, ActionResponse, AgentError, ChatResponse, FactCheckResult};
use crate::attachment::ImageAttachment;
use thiserror::Error;

/// Shown when a 2xx body does not have the expected shape
pub const UNEXPECTED_RESPONSE: &str = "The agent returned an unexpected response.";
const CHAT_FAILED: &str = "An unknown error occurred.";
const ACTION_FAILED: &str = "Failed to perform action.";
const FACT_CHECK_FAILED: &str = "Failed to perform fact check.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: AppState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: AppState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A request is already in progress")]
    RequestPending,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(state: &AppState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state.view, event) {
        // ============================================================
        // Navigation
        // ============================================================
        (View::Landing, Event::Start) | (View::FactChecker, Event::BackToChat) => {
            Ok(TransitionResult::new(with_view(state, View::Chat)))
        }

        (View::Chat, Event::NavigateFactChecker) => {
            Ok(TransitionResult::new(with_view(state, View::FactChecker)))
        }

        // ============================================================
        // Chat
        // ============================================================
        (View::Chat, Event::SubmitQuery { text, image }) => submit_query(state, &text, image),

        (View::Chat, Event::SelectSuggestion { question }) => submit_query(state, &question, None),

        (View::Chat, Event::RunAction { action }) => {
            if state.chat.is_pending() {
                return Err(TransitionError::RequestPending);
            }
            let mut new_state = state.clone();
            let request_id = new_state.allocate_request_id();
            new_state.chat.begin_request(request_id);
            let topic = new_state.chat.last_topic().to_string();

            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::send_action(request_id, action, topic)))
        }

        (_, Event::ChatCompleted { request_id, outcome }) => {
            expect_in_flight(state.chat.in_flight(), request_id)?;
            Ok(TransitionResult::new(chat_completed(state, outcome)))
        }

        (
            _,
            Event::ActionCompleted {
                request_id,
                action,
                outcome,
            },
        ) => {
            expect_in_flight(state.chat.in_flight(), request_id)?;
            Ok(TransitionResult::new(action_completed(state, action, outcome)))
        }

        // ============================================================
        // Fact checker
        // ============================================================
        (View::FactChecker, Event::FactCheckInput { field, value }) => {
            let mut new_state = state.clone();
            new_state.fact_check.set_input(field, value);
            Ok(TransitionResult::new(new_state))
        }

        (View::FactChecker, Event::SubmitFactCheck) => {
            if state.fact_check.is_pending() {
                return Err(TransitionError::RequestPending);
            }
            let mut new_state = state.clone();
            match new_state.fact_check.request() {
                Ok(request) => {
                    let request_id = new_state.allocate_request_id();
                    new_state.fact_check.begin_request(request_id);
                    Ok(TransitionResult::new(new_state)
                        .with_effect(Effect::SendFactCheck { request_id, request }))
                }
                Err(e) => {
                    new_state.fact_check.set_error(e.to_string());
                    Ok(TransitionResult::new(new_state))
                }
            }
        }

        (View::FactChecker, Event::ClearFactCheck) => {
            if state.fact_check.is_pending() {
                return Err(TransitionError::RequestPending);
            }
            let mut new_state = state.clone();
            new_state.fact_check.clear_form();
            Ok(TransitionResult::new(new_state))
        }

        (_, Event::FactCheckCompleted { request_id, outcome }) => {
            expect_in_flight(state.fact_check.in_flight(), request_id)?;
            Ok(TransitionResult::new(fact_check_completed(state, outcome)))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (view, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {view:?} with event {}",
            event.name()
        ))),
    }
}

fn with_view(state: &AppState, view: View) -> AppState {
    let mut new_state = state.clone();
    new_state.view = view;
    new_state
}

fn expect_in_flight(in_flight: Option<RequestId>, request_id: RequestId) -> Result<(), TransitionError> {
    if in_flight == Some(request_id) {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition(format!(
            "Completion for {request_id} does not match in-flight request {in_flight:?}"
        )))
    }
}

fn submit_query(
    state: &AppState,
    text: &str,
    image: Option<ImageAttachment>,
) -> Result<TransitionResult, TransitionError> {
    if state.chat.is_pending() {
        return Err(TransitionError::RequestPending);
    }

    let mut new_state = state.clone();
    let image_url = image.as_ref().map(ImageAttachment::display_url);
    if let Err(e) = new_state.chat.append_user_message(text, image_url) {
        new_state.chat.set_error(e.to_string());
        return Ok(TransitionResult::new(new_state));
    }

    let request_id = new_state.allocate_request_id();
    new_state.chat.begin_request(request_id);

    Ok(TransitionResult::new(new_state).with_effect(Effect::SendChat {
        request_id,
        query: text.to_string(),
        image,
    }))
}

fn chat_completed(state: &AppState, outcome: Result<ChatResponse, AgentError>) -> AppState {
    let mut new_state = state.clone();
    match outcome {
        Ok(response) => {
            new_state.chat.append_agent_message(
                response.answer,
                response.image_urls,
                true,
                response.fact_check,
            );
        }
        Err(e) if e.is_malformed() => new_state.chat.set_error(UNEXPECTED_RESPONSE),
        Err(e) => new_state.chat.set_error(e.user_message(CHAT_FAILED)),
    }
    new_state.chat.end_request();
    new_state
}

fn action_completed(
    state: &AppState,
    action: ActionKind,
    outcome: Result<ActionResponse, AgentError>,
) -> AppState {
    let mut new_state = state.clone();
    match (action, outcome) {
        (ActionKind::SuggestQuestions, Ok(response)) => {
            new_state
                .chat
                .append_agent_suggestions(response.questions.unwrap_or_default());
        }
        (_, Ok(ActionResponse {
            answer: Some(answer),
            ..
        })) => {
            new_state.chat.append_agent_message(answer, vec![], false, None);
        }
        (_, Ok(_)) => new_state.chat.set_error(UNEXPECTED_RESPONSE),
        (_, Err(e)) if e.is_malformed() => new_state.chat.set_error(UNEXPECTED_RESPONSE),
        (_, Err(e)) => new_state.chat.set_error(e.detail_or(ACTION_FAILED)),
    }
    new_state.chat.end_request();
    new_state
}

fn fact_check_completed(state: &AppState, outcome: Result<FactCheckResult, AgentError>) -> AppState {
    let mut new_state = state.clone();
    match outcome {
        Ok(result) => new_state.fact_check.complete(result),
        Err(e) if e.is_malformed() => new_state.fact_check.set_error(UNEXPECTED_RESPONSE),
        Err(e) => new_state.fact_check.set_error(e.user_message(FACT_CHECK_FAILED)),
    }
    new_state.fact_check.end_request();
    new_state
}
