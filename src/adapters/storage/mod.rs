//! Storage Adapters
//!
//! Implementations of the RecordStore port.
//!
//! ## Available Adapters
//!
//! - **JsonlRecordStore** - One append-only JSON-lines file per variant
//! - **InMemoryRecordStore** - Records in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{JsonlRecordStore, InMemoryRecordStore};
//!
//! // Production: file-based storage
//! let store = JsonlRecordStore::new("./data");
//!
//! // Testing: in-memory storage
//! let store = InMemoryRecordStore::new();
//! ```

mod in_memory_record_store;
mod jsonl_record_store;

pub use in_memory_record_store::InMemoryRecordStore;
pub use jsonl_record_store::JsonlRecordStore;
