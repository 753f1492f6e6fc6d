//! Client state machine
//!
//! Elm Architecture: `transition` is pure and returns the effects the
//! runtime must execute.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{AppState, FactCheckField, Message, RequestId, Sender, View};
pub use transition::{transition, TransitionError};
