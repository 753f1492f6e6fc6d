//! Client runtime executor

use crate::agent::{
    ActionRequest, ActionResponse, AgentError, AgentService, ChatRequest, ChatResponse,
    FactCheckRequest, FactCheckResult,
};
use crate::attachment::ImageAttachment;
use crate::state_machine::{transition, AppState, Effect, Event, TransitionError};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Owns the client state and executes the effects of each transition
///
/// Requests run as background tasks; their completions come back through
/// [`ConversationRuntime::next_completion`] and must be handed to
/// [`ConversationRuntime::handle_completion`].
pub struct ConversationRuntime<A>
where
    A: AgentService + 'static,
{
    state: AppState,
    agent: Arc<A>,
    completion_tx: mpsc::UnboundedSender<Event>,
    completion_rx: mpsc::UnboundedReceiver<Event>,
}

impl<A> ConversationRuntime<A>
where
    A: AgentService + 'static,
{
    pub fn new(agent: A) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(),
            agent: Arc::new(agent),
            completion_tx,
            completion_rx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// Apply an event and start any requests it produces
    ///
    /// On error the state is left untouched.
    pub fn dispatch(&mut self, event: Event) -> Result<(), TransitionError> {
        let name = event.name();
        let result = transition(&self.state, event).inspect_err(|e| {
            tracing::debug!(event = name, error = %e, "Event rejected");
        })?;

        tracing::debug!(
            event = name,
            view = ?result.new_state.view(),
            effects = result.effects.len(),
            "Transition applied"
        );
        self.state = result.new_state;

        for effect in result.effects {
            self.spawn_effect(effect);
        }
        Ok(())
    }

    /// Wait for the next finished request
    pub async fn next_completion(&mut self) -> Option<Event> {
        self.completion_rx.recv().await
    }

    /// Apply a completion event. Stale completions are logged and dropped.
    pub fn handle_completion(&mut self, event: Event) {
        let name = event.name();
        if let Err(e) = self.dispatch(event) {
            tracing::warn!(event = name, error = %e, "Ignoring completion");
        }
    }

    /// Process completions until no request is outstanding
    #[cfg(test)]
    pub async fn settle(&mut self) {
        while self.state.chat().is_pending() || self.state.fact_check().is_pending() {
            match self.next_completion().await {
                Some(event) => self.handle_completion(event),
                None => break,
            }
        }
    }

    fn spawn_effect(&self, effect: Effect) {
        let agent = Arc::clone(&self.agent);
        let completion_tx = self.completion_tx.clone();
        let request_id = effect.request_id();

        tokio::spawn(async move {
            tracing::info!(%request_id, "Sending agent request (background)");
            let event = execute_effect(agent.as_ref(), effect).await;
            if completion_tx.send(event).is_err() {
                tracing::debug!(%request_id, "Runtime gone, dropping completion");
            }
        });
    }
}

/// Run one effect against the agent and wrap the outcome as a completion
async fn execute_effect<A: AgentService + ?Sized>(agent: &A, effect: Effect) -> Event {
    match effect {
        Effect::SendChat {
            request_id,
            query,
            image,
        } => Event::ChatCompleted {
            request_id,
            outcome: send_chat(agent, query, image.as_ref()).await,
        },

        Effect::SendAction {
            request_id,
            request,
        } => Event::ActionCompleted {
            request_id,
            action: request.action,
            outcome: send_action(agent, &request).await,
        },

        Effect::SendFactCheck {
            request_id,
            request,
        } => Event::FactCheckCompleted {
            request_id,
            outcome: send_fact_check(agent, &request).await,
        },
    }
}

async fn send_chat<A: AgentService + ?Sized>(
    agent: &A,
    query: String,
    image: Option<&ImageAttachment>,
) -> Result<ChatResponse, AgentError> {
    // Encoded here so the bytes always belong to the image captured at submit
    let image_base64 = match image {
        Some(image) => Some(image.encode().await?),
        None => None,
    };

    agent
        .chat(&ChatRequest {
            query,
            image_base64,
        })
        .await
}

async fn send_action<A: AgentService + ?Sized>(
    agent: &A,
    request: &ActionRequest,
) -> Result<ActionResponse, AgentError> {
    let response = agent.action(request).await?;
    if response.answer.is_none() && response.questions.is_none() {
        tracing::warn!(action = %request.action, "Action response carried no content");
    }
    Ok(response)
}

async fn send_fact_check<A: AgentService + ?Sized>(
    agent: &A,
    request: &FactCheckRequest,
) -> Result<FactCheckResult, AgentError> {
    agent.fact_check(request).await
}
