//! Records module - append-only facts written by sessions.
//!
//! Orders, logs, leads and case outcomes are written through as records.
//! They are never updated in place; the latest matching record wins on
//! read-back.

mod record;

pub use record::{NewRecord, Record, RecordFilter};
