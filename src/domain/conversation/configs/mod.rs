//! Variant-specific conversation policies.
//!
//! Each agent variant is a configuration of the one session engine; this
//! module holds the data that distinguishes them.

mod policies;

pub use policies::{policy_for_variant, VERIFY_CHALLENGE_TURNS};

/// Kinds of records written by the variants.
pub mod record_kinds {
    pub const COFFEE_ORDER: &str = "coffee_order";
    pub const WELLNESS_LOG: &str = "wellness_log";
    pub const WORKOUT: &str = "workout";
    pub const LEAD: &str = "lead";
    pub const FRAUD_CASE_OUTCOME: &str = "fraud_case_outcome";
    pub const GROCERY_ORDER: &str = "grocery_order";
    pub const ORDER: &str = "order";
    pub const IMPROV_ROUND: &str = "improv_round";
}
