//! Grocery Tools - Cart management and order placement.
//!
//! The cart is a collected field mapping catalog id to quantity, so every
//! tool in a turn sees the changes made by the ones before it.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::ToolDispatcher;
use crate::domain::content::{search_catalog, ContentLibrary, Product};
use crate::domain::conversation::tools::{ArgumentSchema, ParamKind, ToolDefinition, ToolOutcome};
use crate::domain::conversation::{record_kinds, DialogueError, Session};
use crate::domain::foundation::AgentVariant;
use crate::ports::{decode_arguments, ToolContext, ToolHandler};

pub const TOOLS: &[&str] = &["add_item", "remove_item", "add_recipe", "show_cart", "place_order"];

const CART_PHASES: &[&str] = &["greeting", "shopping"];
const CART_FIELD: &str = "cart";

type Cart = BTreeMap<String, u64>;

// ═══════════════════════════════════════════════════════════════════════════
// Tool Parameters
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CartItemParams {
    pub item: String,
    pub quantity: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddRecipeParams {
    pub recipe: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderParams {
    pub customer_name: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// Registration
// ═══════════════════════════════════════════════════════════════════════════

pub fn register(dispatcher: &mut ToolDispatcher) -> Result<(), DialogueError> {
    let quantity = ParamKind::Integer { min: 1, max: 50 };

    dispatcher.register(
        ToolDefinition::new(
            "add_item",
            "Add a catalog item to the cart.",
            ArgumentSchema::empty()
                .required("item", ParamKind::String, "Item name or id as the customer said it")
                .optional("quantity", quantity.clone(), "How many to add, default 1"),
        ),
        CART_PHASES,
        Arc::new(AddItem),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "remove_item",
            "Remove an item from the cart, or reduce its quantity.",
            ArgumentSchema::empty()
                .required("item", ParamKind::String, "Item name or id")
                .optional("quantity", quantity, "How many to remove; all if omitted"),
        ),
        CART_PHASES,
        Arc::new(RemoveItem),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "add_recipe",
            "Add one of each ingredient for a dish the customer wants to make.",
            ArgumentSchema::empty().required("recipe", ParamKind::String, "Dish name, e.g. pasta for two"),
        ),
        CART_PHASES,
        Arc::new(AddRecipe),
    )?;

    dispatcher.register(
        ToolDefinition::new("show_cart", "List the cart with prices and total.", ArgumentSchema::empty()),
        CART_PHASES,
        Arc::new(ShowCart),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "place_order",
            "Place the order for everything in the cart.",
            ArgumentSchema::empty().required("customer_name", ParamKind::String, "Name for the order"),
        ),
        &["shopping"],
        Arc::new(PlaceOrder),
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// Cart helpers
// ═══════════════════════════════════════════════════════════════════════════

fn cart_of(session: &Session) -> Cart {
    session
        .field(CART_FIELD)
        .and_then(Value::as_object)
        .map(|items| {
            items
                .iter()
                .filter_map(|(id, qty)| qty.as_u64().map(|qty| (id.clone(), qty)))
                .filter(|(_, qty)| *qty > 0)
                .collect()
        })
        .unwrap_or_default()
}

/// Catalog item by exact id or name, falling back to a fuzzy match.
fn resolve<'a>(content: &'a ContentLibrary, variant: AgentVariant, query: &str) -> Option<&'a Product> {
    let query = query.trim();
    content
        .products(variant)
        .find(|p| p.id.eq_ignore_ascii_case(query) || p.name.eq_ignore_ascii_case(query))
        .or_else(|| search_catalog(content.products(variant), query).into_iter().next())
}

/// Priced cart lines and the order total.
fn priced(content: &ContentLibrary, variant: AgentVariant, cart: &Cart) -> (Vec<Value>, u64) {
    let mut total = 0;
    let lines = cart
        .iter()
        .filter_map(|(id, qty)| {
            let product = content.product(variant, id)?;
            let subtotal = product.price * qty;
            total += subtotal;
            Some(json!({
                "id": product.id,
                "name": product.name,
                "quantity": qty,
                "unit_price": product.price,
                "subtotal": subtotal,
            }))
        })
        .collect();
    (lines, total)
}

fn cart_summary(content: &ContentLibrary, variant: AgentVariant, cart: &Cart) -> Value {
    let (items, total) = priced(content, variant, cart);
    json!({"items": items, "total": total, "empty": cart.is_empty()})
}

struct AddItem;

#[async_trait]
impl ToolHandler for AddItem {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: CartItemParams = decode_arguments("add_item", arguments)?;
        let variant = ctx.session.variant();

        let product = match resolve(ctx.content, variant, &params.item) {
            Some(product) => product,
            None => {
                return Ok(ToolOutcome::reply(json!({
                    "added": false,
                    "message": format!("'{}' is not in the catalog.", params.item),
                })))
            }
        };

        let mut cart = cart_of(ctx.session);
        *cart.entry(product.id.clone()).or_insert(0) += params.quantity.unwrap_or(1);

        Ok(ToolOutcome::reply(json!({
            "added": true,
            "item": {"id": product.id, "name": product.name},
            "cart": cart_summary(ctx.content, variant, &cart),
        }))
        .with_field(CART_FIELD, json!(cart)))
    }
}

struct RemoveItem;

#[async_trait]
impl ToolHandler for RemoveItem {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: CartItemParams = decode_arguments("remove_item", arguments)?;
        let variant = ctx.session.variant();
        let mut cart = cart_of(ctx.session);

        let id = match resolve(ctx.content, variant, &params.item) {
            Some(product) if cart.contains_key(&product.id) => product.id.clone(),
            _ => {
                return Ok(ToolOutcome::reply(json!({
                    "removed": false,
                    "message": format!("'{}' is not in the cart.", params.item),
                })))
            }
        };

        let left = match (params.quantity, cart.get(&id).copied()) {
            (Some(n), Some(have)) => have.saturating_sub(n),
            _ => 0,
        };
        if left == 0 {
            cart.remove(&id);
        } else {
            cart.insert(id.clone(), left);
        }

        Ok(ToolOutcome::reply(json!({
            "removed": true,
            "id": id,
            "remaining": left,
            "cart": cart_summary(ctx.content, variant, &cart),
        }))
        .with_field(CART_FIELD, json!(cart)))
    }
}

struct AddRecipe;

#[async_trait]
impl ToolHandler for AddRecipe {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: AddRecipeParams = decode_arguments("add_recipe", arguments)?;
        let variant = ctx.session.variant();
        let wanted = params.recipe.trim().to_lowercase();

        let recipe = ctx.content.recipes(variant).find(|recipe| {
            let name = recipe.name.to_lowercase();
            name.contains(&wanted) || wanted.contains(&name)
        });
        let recipe = match recipe {
            Some(recipe) => recipe,
            None => {
                let known: Vec<&str> = ctx.content.recipes(variant).map(|r| r.name.as_str()).collect();
                return Ok(ToolOutcome::reply(json!({
                    "added": false,
                    "message": format!("No recipe matches '{}'.", params.recipe),
                    "known_recipes": known,
                })));
            }
        };

        let mut cart = cart_of(ctx.session);
        let mut added = Vec::new();
        for id in &recipe.item_ids {
            if ctx.content.product(variant, id).is_none() {
                tracing::warn!(recipe = %recipe.name, item = %id, "Recipe item missing from catalog");
                continue;
            }
            *cart.entry(id.clone()).or_insert(0) += 1;
            added.push(id.as_str());
        }

        Ok(ToolOutcome::reply(json!({
            "added": true,
            "recipe": recipe.name,
            "items": added,
            "cart": cart_summary(ctx.content, variant, &cart),
        }))
        .with_field(CART_FIELD, json!(cart)))
    }
}

struct ShowCart;

#[async_trait]
impl ToolHandler for ShowCart {
    async fn call(&self, ctx: &ToolContext<'_>, _arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let cart = cart_of(ctx.session);
        Ok(ToolOutcome::reply(cart_summary(ctx.content, ctx.session.variant(), &cart)))
    }
}

struct PlaceOrder;

#[async_trait]
impl ToolHandler for PlaceOrder {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: PlaceOrderParams = decode_arguments("place_order", arguments)?;
        let cart = cart_of(ctx.session);
        if cart.is_empty() {
            return Ok(ToolOutcome::reply(json!({
                "placed": false,
                "message": "The cart is empty. Ask what they would like first.",
            })));
        }

        let (items, total) = priced(ctx.content, ctx.session.variant(), &cart);
        let payload = json!({
            "customer_name": params.customer_name.trim(),
            "items": items,
            "total": total,
        });
        let record_id = ctx.append(record_kinds::GROCERY_ORDER, payload).await?;

        Ok(ToolOutcome::reply(json!({"placed": true, "total": total, "record_id": record_id}))
            .with_field("order_placed", true)
            .with_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tools::testing::Harness;

    fn with_cart(harness: &Harness, cart: Value) -> Session {
        harness.session("shopping", &[(CART_FIELD, cart)])
    }

    #[tokio::test]
    async fn add_item_resolves_by_name() {
        let harness = Harness::new(AgentVariant::GroceryOrder);
        let session = harness.session("shopping", &[]);

        let outcome = harness
            .call(&session, "add_item", json!({"item": "peanut butter", "quantity": 2}))
            .await
            .unwrap();

        assert_eq!(outcome.field_updates()[CART_FIELD], json!({"peanut_butter": 2}));
        assert_eq!(outcome.data()["cart"]["total"], 398);
    }

    #[tokio::test]
    async fn unknown_item_leaves_cart_alone() {
        let harness = Harness::new(AgentVariant::GroceryOrder);
        let session = harness.session("shopping", &[]);

        let outcome = harness.call(&session, "add_item", json!({"item": "caviar"})).await.unwrap();
        assert_eq!(outcome.data()["added"], false);
        assert!(outcome.field_updates().is_empty());
    }

    #[tokio::test]
    async fn remove_item_reduces_then_drops() {
        let harness = Harness::new(AgentVariant::GroceryOrder);
        let session = with_cart(&harness, json!({"eggs": 3, "milk": 1}));

        let outcome = harness
            .call(&session, "remove_item", json!({"item": "eggs", "quantity": 1}))
            .await
            .unwrap();
        assert_eq!(outcome.field_updates()[CART_FIELD], json!({"eggs": 2, "milk": 1}));

        let outcome = harness.call(&session, "remove_item", json!({"item": "milk"})).await.unwrap();
        assert_eq!(outcome.field_updates()[CART_FIELD], json!({"eggs": 3}));
    }

    #[tokio::test]
    async fn add_recipe_adds_one_of_each_ingredient() {
        let harness = Harness::new(AgentVariant::GroceryOrder);
        let session = with_cart(&harness, json!({"bread": 1}));

        let outcome = harness
            .call(&session, "add_recipe", json!({"recipe": "a peanut butter sandwich"}))
            .await
            .unwrap();

        assert_eq!(
            outcome.field_updates()[CART_FIELD],
            json!({"bread": 2, "peanut_butter": 1})
        );
    }

    #[tokio::test]
    async fn place_order_refuses_empty_cart() {
        let harness = Harness::new(AgentVariant::GroceryOrder);
        let session = harness.session("shopping", &[]);

        let outcome = harness
            .call(&session, "place_order", json!({"customer_name": "Meera"}))
            .await
            .unwrap();

        assert_eq!(outcome.data()["placed"], false);
        assert!(!outcome.field_updates().contains_key("order_placed"));
        assert!(harness.store.records(AgentVariant::GroceryOrder).await.is_empty());
    }

    #[tokio::test]
    async fn place_order_appends_priced_lines() {
        let harness = Harness::new(AgentVariant::GroceryOrder);
        let session = with_cart(&harness, json!({"milk": 2, "chips": 3}));

        harness
            .call(&session, "place_order", json!({"customer_name": "Meera"}))
            .await
            .unwrap();

        let records = harness.store.records(AgentVariant::GroceryOrder).await;
        let order = &records[0].payload;
        assert_eq!(order["customer_name"], "Meera");
        assert_eq!(order["total"], 2 * 56 + 3 * 20);
        assert_eq!(order["items"][0]["id"], "chips");
        assert_eq!(order["items"][0]["subtotal"], 60);
    }
}
