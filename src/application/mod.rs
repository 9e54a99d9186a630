//! Application layer - Session control, tool dispatch and turn handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The `SessionController` owns session state; the `ToolDispatcher` of each
//! variant runs its tools; the handlers combine both into the two commands
//! the voice adapter issues: start a session and process a turn.

pub mod bootstrap;
pub mod handlers;
pub mod tools;

mod session_controller;
mod tool_dispatcher;

pub use bootstrap::{BootstrapError, VoiceFlowsRuntime};
pub use handlers::{
    ProcessTurnCommand, ProcessTurnHandler, StartSessionCommand, StartSessionHandler,
    StartSessionResult, TurnReport,
};
pub use session_controller::{
    AdvanceOutcome, AdvanceStatus, SessionController, SessionGuard, TurnInput,
};
pub use tool_dispatcher::ToolDispatcher;
