//! Application handlers.
//!
//! Command handlers that orchestrate the session controller and the tool
//! dispatchers for one voice session.

pub mod session;

pub use session::{
    ProcessTurnCommand, ProcessTurnHandler, StartSessionCommand, StartSessionHandler,
    StartSessionResult, TurnReport,
};
