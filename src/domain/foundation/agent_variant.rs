//! AgentVariant enum naming the ten scripted voice agents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// The scripted agents served by the engine.
///
/// Every variant is a configuration instance of the same session engine:
/// a conversation policy plus a tool set plus (optionally) content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentVariant {
    Starter,
    CoffeeOrder,
    WellnessCheckIn,
    FitnessLog,
    LeadCapture,
    FraudAlert,
    GroceryOrder,
    GameMaster,
    Commerce,
    ImprovBattle,
}

impl AgentVariant {
    /// Returns all variants in catalogue order.
    pub fn all() -> &'static [AgentVariant] {
        &[
            AgentVariant::Starter,
            AgentVariant::CoffeeOrder,
            AgentVariant::WellnessCheckIn,
            AgentVariant::FitnessLog,
            AgentVariant::LeadCapture,
            AgentVariant::FraudAlert,
            AgentVariant::GroceryOrder,
            AgentVariant::GameMaster,
            AgentVariant::Commerce,
            AgentVariant::ImprovBattle,
        ]
    }

    /// Stable snake_case key, used for file names and config values.
    pub fn key(&self) -> &'static str {
        match self {
            AgentVariant::Starter => "starter",
            AgentVariant::CoffeeOrder => "coffee_order",
            AgentVariant::WellnessCheckIn => "wellness_check_in",
            AgentVariant::FitnessLog => "fitness_log",
            AgentVariant::LeadCapture => "lead_capture",
            AgentVariant::FraudAlert => "fraud_alert",
            AgentVariant::GroceryOrder => "grocery_order",
            AgentVariant::GameMaster => "game_master",
            AgentVariant::Commerce => "commerce",
            AgentVariant::ImprovBattle => "improv_battle",
        }
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentVariant::Starter => "Starter Assistant",
            AgentVariant::CoffeeOrder => "Coffee Barista",
            AgentVariant::WellnessCheckIn => "Wellness Companion",
            AgentVariant::FitnessLog => "Fitness Coach",
            AgentVariant::LeadCapture => "Sales Development Rep",
            AgentVariant::FraudAlert => "Fraud Alert Desk",
            AgentVariant::GroceryOrder => "Grocery Ordering",
            AgentVariant::GameMaster => "Game Master",
            AgentVariant::Commerce => "Shopping Assistant",
            AgentVariant::ImprovBattle => "Improv Battle Host",
        }
    }
}

impl fmt::Display for AgentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for AgentVariant {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|v| v.key() == wanted)
            .ok_or_else(|| ValidationError::invalid_format("variant", format!("unknown agent variant '{}'", s)))
    }
}
