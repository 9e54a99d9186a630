//! Coffee Tools - Building and confirming a drink order.
//!
//! Order details live in collected fields; the policy writes the order
//! record through to storage once every required detail is present.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::application::ToolDispatcher;
use crate::domain::conversation::tools::{ArgumentSchema, ParamKind, ToolDefinition, ToolOutcome};
use crate::domain::conversation::{CollectedFields, DialogueError, Session};
use crate::ports::{decode_arguments, ToolContext, ToolHandler};

pub const TOOLS: &[&str] = &["update_order", "confirm_order"];

pub const SIZES: &[&str] = &["small", "medium", "large"];

const ORDER_FIELDS: &[&str] = &["drinkType", "size", "milk", "extras", "name"];
const REQUIRED_FIELDS: &[&str] = &["drinkType", "size", "milk", "name"];

// ═══════════════════════════════════════════════════════════════════════════
// Tool Parameters
// ═══════════════════════════════════════════════════════════════════════════

/// Parameters for updating the order. Omitted fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderParams {
    #[serde(rename = "drinkType")]
    pub drink_type: Option<String>,
    pub size: Option<String>,
    pub milk: Option<String>,
    pub extras: Option<Vec<String>>,
    pub name: Option<String>,
}

/// Parameters for the customer's answer to the read-back.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmOrderParams {
    pub confirmed: bool,
}

// ═══════════════════════════════════════════════════════════════════════════
// Registration
// ═══════════════════════════════════════════════════════════════════════════

pub fn register(dispatcher: &mut ToolDispatcher) -> Result<(), DialogueError> {
    dispatcher.register(
        ToolDefinition::new(
            "update_order",
            "Record any order details the customer just gave. Only include fields that were mentioned.",
            ArgumentSchema::empty()
                .optional("drinkType", ParamKind::String, "Drink, e.g. latte, cappuccino, cold brew")
                .optional("size", ParamKind::Choice(SIZES), "Cup size")
                .optional("milk", ParamKind::String, "Milk choice, e.g. whole, oat, none")
                .optional("extras", ParamKind::StringList, "Extras such as an extra shot or syrup")
                .optional("name", ParamKind::String, "Name for the order"),
        ),
        &["greeting", "collecting", "confirming"],
        Arc::new(UpdateOrder),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "confirm_order",
            "Record whether the customer confirmed the order as read back.",
            ArgumentSchema::empty().required("confirmed", ParamKind::Boolean, "True if the order is correct"),
        ),
        &["confirming"],
        Arc::new(ConfirmOrder),
    )
}

/// The order as it will stand once `updates` are applied.
fn order_view(session: &Session, updates: &CollectedFields) -> Value {
    let mut order = Map::new();
    for field in ORDER_FIELDS {
        if let Some(value) = updates.get(*field).or_else(|| session.field(field)) {
            order.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(order)
}

fn missing(order: &Value) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| order.get(field).map_or(true, Value::is_null))
        .collect()
}

struct UpdateOrder;

#[async_trait]
impl ToolHandler for UpdateOrder {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: UpdateOrderParams = decode_arguments("update_order", arguments)?;

        let mut updates = CollectedFields::new();
        let text_fields = [
            ("drinkType", params.drink_type),
            ("size", params.size),
            ("milk", params.milk),
            ("name", params.name),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                updates.insert(field.to_string(), Value::String(value.trim().to_string()));
            }
        }
        if let Some(extras) = params.extras {
            updates.insert("extras".to_string(), json!(extras));
        }

        let order = order_view(ctx.session, &updates);
        let outcome = ToolOutcome::reply(json!({
            "order": order,
            "missing": missing(&order),
        }));
        Ok(updates
            .into_iter()
            .fold(outcome, |outcome, (field, value)| outcome.with_field(&field, value)))
    }
}

struct ConfirmOrder;

#[async_trait]
impl ToolHandler for ConfirmOrder {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: ConfirmOrderParams = decode_arguments("confirm_order", arguments)?;
        let order = order_view(ctx.session, &CollectedFields::new());

        Ok(ToolOutcome::reply(json!({
            "confirmed": params.confirmed,
            "order": order,
        }))
        .with_field("confirmed", params.confirmed))
    }
}
