//! Voice Flows - Per-session dialogue engine for scripted voice agents
//!
//! Each agent variant (coffee ordering, wellness check-ins, fraud alerts,
//! improv games and so on) is a declarative conversation policy plus a
//! tool set driving one shared session state machine. The voice pipeline
//! feeds utterances and tool calls in; the engine hands back the prompt
//! context for the next response.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
