//! Session command handlers.

mod process_turn;
mod start_session;

pub use process_turn::{ProcessTurnCommand, ProcessTurnHandler, TurnReport};
pub use start_session::{StartSessionCommand, StartSessionHandler, StartSessionResult};
