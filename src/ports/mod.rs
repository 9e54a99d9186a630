//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `RecordStore` - Append-only persistence of orders, logs and outcomes
//! - `ContentSource` - Loading of read-only per-variant content
//! - `ToolHandler` - Executable body of a tool registered with the dispatcher

mod content_source;
mod record_store;
mod tool_handler;

pub use content_source::{ContentSource, ContentSourceError};
pub use record_store::{RecordStore, RecordStoreError};
pub use tool_handler::{decode_arguments, ToolContext, ToolHandler};
