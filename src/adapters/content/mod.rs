//! Content Adapters
//!
//! Implementations of the ContentSource port.

mod file_content_source;

pub use file_content_source::FileContentSource;
