//! Content items.

use serde::{Deserialize, Serialize};

/// An improv scene prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub prompt: String,
}

/// A question/answer pair searchable by keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A catalog entry. Prices are whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub price: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// A named list of catalog item ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub item_ids: Vec<String>,
}

/// A suspicious-transaction case awaiting the customer's review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudCase {
    pub case_id: String,
    pub user_name: String,
    pub security_question: String,
    pub security_answer: String,
    pub merchant: String,
    pub amount: u64,
    pub currency: String,
    pub location: String,
    pub time: String,
    pub card_ending: String,
}

impl FraudCase {
    /// Transaction details safe to read back after verification.
    pub fn transaction_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "merchant": self.merchant,
            "amount": self.amount,
            "currency": self.currency,
            "location": self.location,
            "time": self.time,
            "card_ending": self.card_ending,
        })
    }
}

/// One entry of a variant's read-only content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Scenario(Scenario),
    Faq(Faq),
    Product(Product),
    Recipe(Recipe),
    FraudCase(FraudCase),
}

impl ContentItem {
    pub fn as_scenario(&self) -> Option<&Scenario> {
        match self {
            ContentItem::Scenario(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_faq(&self) -> Option<&Faq> {
        match self {
            ContentItem::Faq(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_product(&self) -> Option<&Product> {
        match self {
            ContentItem::Product(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_recipe(&self) -> Option<&Recipe> {
        match self {
            ContentItem::Recipe(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_fraud_case(&self) -> Option<&FraudCase> {
        match self {
            ContentItem::FraudCase(c) => Some(c),
            _ => None,
        }
    }
}
