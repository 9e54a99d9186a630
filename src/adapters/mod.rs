//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Record stores (JSON-lines files, in-memory)
//! - `content` - Content sources (JSON/YAML files with built-in fallback)

pub mod content;
pub mod storage;

pub use content::FileContentSource;
pub use storage::{InMemoryRecordStore, JsonlRecordStore};
