//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the voice-flows domain.

mod agent_variant;
mod errors;
mod ids;
mod session_status;
mod state_machine;
mod timestamp;

pub use agent_variant::AgentVariant;
pub use errors::{ErrorCode, ValidationError};
pub use ids::{RecordId, SessionId, UserId};
pub use session_status::SessionStatus;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
