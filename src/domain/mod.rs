//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `conversation` - Session aggregate, conversation policies and tool types
//! - `content` - Read-only per-variant content and search
//! - `records` - Append-only records written by sessions

pub mod content;
pub mod conversation;
pub mod foundation;
pub mod records;
