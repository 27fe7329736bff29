//! ragchat conversation layer.
//!
//! This crate contains:
//! - **controller**: the conversation controller (sessions, transcript, directory)
//! - **guided**: quick-reply button resolution (scripted flows, FAQ questions)
//! - **worker**: the ordered background queue for fire-and-forget store calls

pub mod controller;
pub mod guided;
mod state;
mod worker;

#[cfg(test)]
mod testing;

pub use controller::ConversationController;
pub use guided::{GuidedAction, GuidedFlows, ScriptedExchange};
