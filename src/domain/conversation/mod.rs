//! Conversation domain module.
//!
//! The session aggregate, the declarative per-variant conversation policy
//! that moves it between phases, and the tool types the conversation
//! driver uses to act on it.

mod errors;
mod phase;
mod policy;
mod prompt;
mod session;

pub mod configs;
pub mod tools;

pub use errors::DialogueError;
pub use phase::{PhaseId, PhaseKind, PhaseSpec};
pub use policy::{
    ConversationPolicy, Gate, PersistEffect, PolicyBuilder, PolicyDecision, Transition,
    TurnSnapshot, DEFAULT_EXIT_PHRASES,
};
pub use prompt::PromptContext;
pub use session::{field_present, CollectedFields, Session};
pub use configs::{policy_for_variant, record_kinds};
