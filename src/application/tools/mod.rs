//! Tool handlers for every agent variant.
//!
//! Each submodule declares the variant's tool set (definition, allowed
//! phases, handler) and registers it with a [`ToolDispatcher`].
//!
//! ## Module Structure
//!
//! - [`starter`] - Ending a plain assistant conversation
//! - [`coffee`] - Building and confirming a drink order
//! - [`wellness`] - Mood and goals check-ins with recall
//! - [`fitness`] - Workout logging with recall
//! - [`lead`] - FAQ answers and lead capture
//! - [`fraud`] - Case lookup, identity challenge and outcome
//! - [`grocery`] - Cart management and order placement
//! - [`game_master`] - Story decisions
//! - [`commerce`] - Catalog browsing and orders
//! - [`improv`] - Scenario rounds

pub mod coffee;
pub mod commerce;
pub mod fitness;
pub mod fraud;
pub mod game_master;
pub mod grocery;
pub mod improv;
pub mod lead;
pub mod starter;
pub mod wellness;

use crate::application::ToolDispatcher;
use crate::domain::conversation::DialogueError;
use crate::domain::foundation::{AgentVariant, ValidationError};

/// Registers the tool set of the dispatcher's variant.
pub fn register_variant_tools(dispatcher: &mut ToolDispatcher) -> Result<(), DialogueError> {
    match dispatcher.variant() {
        AgentVariant::Starter => starter::register(dispatcher),
        AgentVariant::CoffeeOrder => coffee::register(dispatcher),
        AgentVariant::WellnessCheckIn => wellness::register(dispatcher),
        AgentVariant::FitnessLog => fitness::register(dispatcher),
        AgentVariant::LeadCapture => lead::register(dispatcher),
        AgentVariant::FraudAlert => fraud::register(dispatcher),
        AgentVariant::GroceryOrder => grocery::register(dispatcher),
        AgentVariant::GameMaster => game_master::register(dispatcher),
        AgentVariant::Commerce => commerce::register(dispatcher),
        AgentVariant::ImprovBattle => improv::register(dispatcher),
    }
}

/// Tool names a variant's directives refer to.
///
/// Checked against the dispatcher at startup so a directive never points
/// the conversation driver at a tool that does not exist.
pub fn declared_tools(variant: AgentVariant) -> &'static [&'static str] {
    match variant {
        AgentVariant::Starter => starter::TOOLS,
        AgentVariant::CoffeeOrder => coffee::TOOLS,
        AgentVariant::WellnessCheckIn => wellness::TOOLS,
        AgentVariant::FitnessLog => fitness::TOOLS,
        AgentVariant::LeadCapture => lead::TOOLS,
        AgentVariant::FraudAlert => fraud::TOOLS,
        AgentVariant::GroceryOrder => grocery::TOOLS,
        AgentVariant::GameMaster => game_master::TOOLS,
        AgentVariant::Commerce => commerce::TOOLS,
        AgentVariant::ImprovBattle => improv::TOOLS,
    }
}

/// A collected field the tool needs was never provided.
pub(crate) fn missing_field(tool: &str, field: &str) -> DialogueError {
    DialogueError::invalid_arguments(tool, ValidationError::empty_field(field))
}
