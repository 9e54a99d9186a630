//! Commerce Tools - Catalog browsing and order placement.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ToolDispatcher;
use crate::domain::content::ProductFilter;
use crate::domain::conversation::tools::{ArgumentSchema, ParamKind, ToolDefinition, ToolOutcome};
use crate::domain::conversation::{record_kinds, DialogueError};
use crate::domain::foundation::ValidationError;
use crate::domain::records::RecordFilter;
use crate::ports::{decode_arguments, ToolContext, ToolHandler};

pub const TOOLS: &[&str] = &["list_products", "create_order", "get_last_order"];

/// Results read out per search; more overwhelms a voice listener.
const SPOKEN_RESULTS: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderParams {
    pub product_id: String,
    pub quantity: Option<u64>,
}

pub fn register(dispatcher: &mut ToolDispatcher) -> Result<(), DialogueError> {
    dispatcher.register(
        ToolDefinition::new(
            "list_products",
            "Search the catalog. All filters are optional.",
            ArgumentSchema::empty()
                .optional("category", ParamKind::String, "mug, hoodie, tshirt or cap")
                .optional("color", ParamKind::String, "Colour, e.g. black")
                .optional(
                    "max_price",
                    ParamKind::Integer { min: 0, max: 10_000_000 },
                    "Highest price the shopper will pay",
                )
                .optional("keyword", ParamKind::String, "Word to look for in name or description"),
        ),
        &["browsing", "ordering"],
        Arc::new(ListProducts),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "create_order",
            "Order a product the shopper has chosen.",
            ArgumentSchema::empty()
                .required("product_id", ParamKind::String, "Catalog id from list_products")
                .optional("quantity", ParamKind::Integer { min: 1, max: 10 }, "Quantity, default 1"),
        ),
        &["ordering"],
        Arc::new(CreateOrder),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "get_last_order",
            "Look up the shopper's most recent order.",
            ArgumentSchema::empty(),
        ),
        &["browsing", "ordering"],
        Arc::new(GetLastOrder),
    )
}

struct ListProducts;

#[async_trait]
impl ToolHandler for ListProducts {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let filter: ProductFilter = decode_arguments("list_products", arguments)?;
        let matches: Vec<_> = ctx
            .content
            .products(ctx.session.variant())
            .filter(|product| filter.matches(product))
            .collect();

        let listed: Vec<Value> = matches
            .iter()
            .take(SPOKEN_RESULTS)
            .map(|p| {
                json!({
                    "id": p.id,
                    "name": p.name,
                    "price": p.price,
                    "currency": p.currency,
                    "color": p.color,
                })
            })
            .collect();
        let outcome = ToolOutcome::reply(json!({
            "total_matches": matches.len(),
            "products": listed,
        }))
        .with_field("filters_applied", json!(filter));

        if matches.is_empty() {
            return Ok(outcome);
        }
        let shortlist: Vec<&str> = matches.iter().map(|p| p.id.as_str()).collect();
        Ok(outcome.with_field("shortlist", json!(shortlist)))
    }
}

/// Short uppercase order reference, unique without consulting the store.
fn new_order_id() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("ORD-{}", &hex[..12])
}

struct CreateOrder;

#[async_trait]
impl ToolHandler for CreateOrder {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: CreateOrderParams = decode_arguments("create_order", arguments)?;
        let variant = ctx.session.variant();
        let product = ctx.content.product(variant, params.product_id.trim()).ok_or_else(|| {
            DialogueError::invalid_arguments(
                "create_order",
                ValidationError::invalid_format("product_id", "is not in the catalog"),
            )
        })?;

        let quantity = params.quantity.unwrap_or(1);
        let order_id = new_order_id();
        let total = product.price * quantity;

        let payload = json!({
            "order_id": order_id,
            "items": [{
                "product_id": product.id,
                "name": product.name,
                "quantity": quantity,
                "unit_price": product.price,
            }],
            "filters_applied": ctx.session.field("filters_applied").cloned().unwrap_or_else(|| json!({})),
            "total": total,
            "currency": product.currency,
        });
        let record_id = ctx.append(record_kinds::ORDER, payload).await?;

        Ok(ToolOutcome::reply(json!({
            "order_id": order_id,
            "product": product.name,
            "quantity": quantity,
            "total": total,
            "currency": product.currency,
            "record_id": record_id,
        }))
        .with_field("last_order_id", order_id.as_str())
        .with_record())
    }
}

struct GetLastOrder;

#[async_trait]
impl ToolHandler for GetLastOrder {
    async fn call(&self, ctx: &ToolContext<'_>, _arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let filter = RecordFilter::of_kind(record_kinds::ORDER).for_user(ctx.session.user_id().cloned());
        let latest = ctx.store.read_latest(ctx.session.variant(), &filter).await?;

        Ok(ToolOutcome::reply(match latest {
            Some(record) => json!({"found": true, "order": record.payload}),
            None => json!({"found": false}),
        }))
    }
}
