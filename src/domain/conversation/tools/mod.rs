//! Tool domain types.
//!
//! Tools are how the conversation driver changes session state and reaches
//! storage. Each variant registers a set of tools, each with an argument
//! schema and the phases it may run in.
//!
//! ## Key Types
//!
//! - [`ArgumentSchema`] - Declared arguments, validated before any handler runs
//! - [`ToolDefinition`] - Name, description and schema advertised to the driver
//! - [`ToolRegistry`] - Phase-scoped lookup for one variant
//! - [`ToolCall`] / [`ToolOutcome`] / [`ToolResponse`] - Request, handler result, driver-facing report

mod schema;
mod tool_call;
mod tool_definition;
mod tool_registry;

pub use schema::{ArgumentSchema, Param, ParamKind};
pub use tool_call::{ToolCall, ToolOutcome, ToolResponse};
pub use tool_definition::ToolDefinition;
pub use tool_registry::ToolRegistry;
