//! Effects produced by state transitions

use super::state::RequestId;
use crate::agent::{ActionKind, ActionRequest, FactCheckRequest};
use crate::attachment::ImageAttachment;

/// Transport calls to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// `POST /chat`; the image is encoded just before the body is built
    SendChat {
        request_id: RequestId,
        query: String,
        image: Option<ImageAttachment>,
    },

    /// `POST /action`
    SendAction {
        request_id: RequestId,
        request: ActionRequest,
    },

    /// `POST /fact-check`
    SendFactCheck {
        request_id: RequestId,
        request: FactCheckRequest,
    },
}

impl Effect {
    pub fn send_action(request_id: RequestId, action: ActionKind, topic: impl Into<String>) -> Self {
        Effect::SendAction {
            request_id,
            request: ActionRequest {
                action,
                topic: topic.into(),
            },
        }
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            Effect::SendChat { request_id, .. }
            | Effect::SendAction { request_id, .. }
            | Effect::SendFactCheck { request_id, .. } => *request_id,
        }
    }
}
