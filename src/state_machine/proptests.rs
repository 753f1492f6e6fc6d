//! Property-based tests for the state machine
//!
//! Random gesture/completion sequences are replayed and the conversation
//! invariants are checked after every step.

use super::state::*;
use super::transition::*;
use super::*;
use crate::agent::{ActionKind, ActionResponse, AgentError, ChatResponse, FactCheckResult};
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Arbitrary Generators
// ============================================================================

#[derive(Debug, Clone)]
enum Step {
    Gesture(Event),
    /// Resolve the oldest outstanding effect
    Complete { success: bool, text: String },
}

fn arb_action() -> impl Strategy<Value = ActionKind> {
    prop_oneof![
        Just(ActionKind::Eli5),
        Just(ActionKind::DeepDive),
        Just(ActionKind::SuggestQuestions),
    ]
}

fn arb_field() -> impl Strategy<Value = FactCheckField> {
    prop_oneof![
        Just(FactCheckField::OriginalQuery),
        Just(FactCheckField::AnswerToCheck),
    ]
}

fn arb_gesture() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Start),
        Just(Event::NavigateFactChecker),
        Just(Event::BackToChat),
        "[a-z ]{0,12}".prop_map(|text| Event::SubmitQuery { text, image: None }),
        arb_action().prop_map(|action| Event::RunAction { action }),
        "[a-z]{1,8}".prop_map(|question| Event::SelectSuggestion { question }),
        (arb_field(), "[a-z ]{0,8}").prop_map(|(field, value)| Event::FactCheckInput { field, value }),
        Just(Event::SubmitFactCheck),
        Just(Event::ClearFactCheck),
    ]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => arb_gesture().prop_map(Step::Gesture),
        2 => (any::<bool>(), "[a-z]{1,10}").prop_map(|(success, text)| Step::Complete { success, text }),
    ]
}

fn completion_for(effect: &Effect, success: bool, text: String) -> Event {
    let failure = || AgentError::from_status(500, r#"{"detail":"boom"}"#);
    match effect {
        Effect::SendChat { request_id, .. } => Event::ChatCompleted {
            request_id: *request_id,
            outcome: if success {
                Ok(ChatResponse {
                    answer: text,
                    image_urls: vec![],
                    fact_check: None,
                })
            } else {
                Err(failure())
            },
        },
        Effect::SendAction {
            request_id,
            request,
        } => Event::ActionCompleted {
            request_id: *request_id,
            action: request.action,
            outcome: if success {
                Ok(ActionResponse {
                    answer: Some(text.clone()),
                    questions: Some(vec![text]),
                })
            } else {
                Err(failure())
            },
        },
        Effect::SendFactCheck { request_id, .. } => Event::FactCheckCompleted {
            request_id: *request_id,
            outcome: if success {
                Ok(FactCheckResult {
                    is_accurate: true,
                    confidence_score: 0.5,
                    verified_facts: vec![text],
                    issues_found: vec![],
                    recommendations: None,
                })
            } else {
                Err(failure())
            },
        },
    }
}

/// Replays steps and calls `check(before, after, event_name)` after each
/// accepted transition.
fn replay(
    steps: Vec<Step>,
    mut check: impl FnMut(&AppState, &AppState, &str) -> Result<(), TestCaseError>,
) -> Result<(), TestCaseError> {
    let mut state = AppState::new();
    let mut outstanding: Vec<Effect> = Vec::new();

    for step in steps {
        let event = match step {
            Step::Gesture(event) => event,
            Step::Complete { success, text } => {
                if outstanding.is_empty() {
                    continue;
                }
                let effect = outstanding.remove(0);
                completion_for(&effect, success, text)
            }
        };
        let name = event.name();
        if let Ok(result) = transition(&state, event) {
            check(&state, &result.new_state, name)?;
            outstanding.extend(result.effects);
            state = result.new_state;
        }
    }
    Ok(())
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Only one chat request and one fact check can be outstanding
    #[test]
    fn prop_single_request_in_flight(steps in proptest::collection::vec(arb_step(), 1..40)) {
        let mut state = AppState::new();
        let mut outstanding: Vec<Effect> = Vec::new();
        for step in steps {
            let event = match step {
                Step::Gesture(event) => event,
                Step::Complete { success, text } => {
                    if outstanding.is_empty() {
                        continue;
                    }
                    let effect = outstanding.remove(0);
                    completion_for(&effect, success, text)
                }
            };
            if let Ok(result) = transition(&state, event) {
                for effect in &result.effects {
                    let accepted = match effect {
                        Effect::SendFactCheck { .. } => !state.fact_check().is_pending(),
                        _ => !state.chat().is_pending(),
                    };
                    prop_assert!(accepted, "request started while pending: {:?}", effect);
                }
                prop_assert!(result.effects.len() <= 1);
                outstanding.extend(result.effects);
                state = result.new_state;
            }

            let chat_outstanding = outstanding
                .iter()
                .filter(|e| !matches!(e, Effect::SendFactCheck { .. }))
                .count();
            prop_assert_eq!(chat_outstanding, usize::from(state.chat().is_pending()));
            let checks_outstanding = outstanding.len() - chat_outstanding;
            prop_assert_eq!(checks_outstanding, usize::from(state.fact_check().is_pending()));
        }
    }

    /// The message log only grows and earlier entries never change
    #[test]
    fn prop_log_is_append_only(steps in proptest::collection::vec(arb_step(), 1..40)) {
        replay(steps, |before, after, name| {
            let old = before.chat().messages();
            let new = after.chat().messages();
            prop_assert!(new.len() >= old.len(), "{} shrank the log", name);
            prop_assert!(new.len() - old.len() <= 1, "{} appended more than one message", name);
            prop_assert_eq!(&new[..old.len()], old);
            Ok(())
        })?;
    }

    /// Message ids stay unique within a conversation
    #[test]
    fn prop_message_ids_unique(steps in proptest::collection::vec(arb_step(), 1..40)) {
        replay(steps, |_, after, _| {
            let ids: HashSet<_> = after.chat().messages().iter().map(|m| &m.id).collect();
            prop_assert_eq!(ids.len(), after.chat().messages().len());
            Ok(())
        })?;
    }

    /// `last_topic` always equals the newest non-empty user text
    #[test]
    fn prop_last_topic_tracks_user_text(steps in proptest::collection::vec(arb_step(), 1..40)) {
        replay(steps, |_, after, _| {
            let expected = after
                .chat()
                .messages()
                .iter()
                .rev()
                .filter(|m| m.sender == Sender::User)
                .find_map(|m| m.text.as_deref())
                .unwrap_or("");
            prop_assert_eq!(after.chat().last_topic(), expected);
            Ok(())
        })?;
    }

    /// Only plain chat answers offer follow-up actions
    #[test]
    fn prop_only_chat_answers_are_actionable(steps in proptest::collection::vec(arb_step(), 1..40)) {
        replay(steps, |_, after, _| {
            for message in after.chat().messages() {
                if message.is_actionable {
                    prop_assert_eq!(message.sender, Sender::Agent);
                    prop_assert!(message.suggestions.is_none());
                }
            }
            Ok(())
        })?;
    }

    /// Rejected events never produce effects; a rejected gesture leaves state untouched
    #[test]
    fn prop_gestures_are_view_scoped(steps in proptest::collection::vec(arb_step(), 1..30), gesture in arb_gesture()) {
        replay(steps, |_, after, _| {
            let view = after.view();
            match transition(after, gesture.clone()) {
                Ok(result) => {
                    if view == View::Landing {
                        prop_assert!(matches!(gesture, Event::Start));
                        prop_assert!(result.effects.is_empty());
                    }
                }
                Err(TransitionError::RequestPending) => {
                    prop_assert!(after.chat().is_pending() || after.fact_check().is_pending());
                }
                Err(TransitionError::InvalidTransition(_)) => {}
            }
            Ok(())
        })?;
    }
}
