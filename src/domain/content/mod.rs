//! Content module - read-only catalogues, FAQs, scenarios and cases.
//!
//! Loaded once per process and shared by every session. Searches are pure
//! functions over borrowed items.

mod builtin;
mod item;
mod library;
mod search;

pub use builtin::builtin_content;
pub use item::{ContentItem, FraudCase, Faq, Product, Recipe, Scenario};
pub use library::ContentLibrary;
pub use search::{best_faq, faq_score, search_catalog, ProductFilter};
