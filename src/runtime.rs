//! Runtime that drives the client state machine
//!
//! Executes effects as background tasks and feeds their completions back
//! through the pure transition function.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
