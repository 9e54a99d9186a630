//! Lead Capture Tools - FAQ answers and lead details for the SDR agent.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::application::tools::missing_field;
use crate::application::ToolDispatcher;
use crate::domain::content::best_faq;
use crate::domain::conversation::tools::{ArgumentSchema, ParamKind, ToolDefinition, ToolOutcome};
use crate::domain::conversation::{record_kinds, CollectedFields, DialogueError};
use crate::ports::{decode_arguments, ToolContext, ToolHandler};

pub const TOOLS: &[&str] = &["search_faq", "update_lead", "save_lead"];

/// Lead details, required ones first.
const LEAD_FIELDS: &[&str] = &["name", "contact", "interest", "company", "role", "team_size", "timeline"];
const REQUIRED: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchFaqParams {
    pub question: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveLeadParams {
    pub summary: String,
}

pub fn register(dispatcher: &mut ToolDispatcher) -> Result<(), DialogueError> {
    dispatcher.register(
        ToolDefinition::new(
            "search_faq",
            "Find the answer to a product or pricing question. Only answer from the result.",
            ArgumentSchema::empty().required("question", ParamKind::String, "The visitor's question"),
        ),
        &["greeting", "discovery", "wrap_up"],
        Arc::new(SearchFaq),
    )?;

    let lead_schema = LEAD_FIELDS.iter().fold(ArgumentSchema::empty(), |schema, field| {
        schema.optional(*field, ParamKind::String, field_description(field))
    });
    dispatcher.register(
        ToolDefinition::new(
            "update_lead",
            "Record lead details the visitor just shared. Only include fields that were mentioned.",
            lead_schema,
        ),
        &["greeting", "discovery", "wrap_up"],
        Arc::new(UpdateLead),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "save_lead",
            "Save the lead once name, contact and interest are known and summarised.",
            ArgumentSchema::empty().required("summary", ParamKind::String, "Short recap of the visitor's needs"),
        ),
        &["wrap_up"],
        Arc::new(SaveLead),
    )
}

fn field_description(field: &str) -> &'static str {
    match field {
        "name" => "Visitor's name",
        "contact" => "Email address or phone number",
        "interest" => "What they are interested in",
        "company" => "Company they work for",
        "role" => "Their role or title",
        "team_size" => "How many people would use the product",
        _ => "When they want to get started",
    }
}

struct SearchFaq;

#[async_trait]
impl ToolHandler for SearchFaq {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: SearchFaqParams = decode_arguments("search_faq", arguments)?;
        let faqs = ctx.content.faqs(ctx.session.variant());

        Ok(ToolOutcome::reply(match best_faq(faqs, &params.question) {
            Some(faq) => json!({
                "found": true,
                "question": faq.question,
                "answer": faq.answer,
            }),
            None => json!({
                "found": false,
                "message": "No answer in the FAQ. Offer to have someone follow up.",
            }),
        }))
    }
}

struct UpdateLead;

#[async_trait]
impl ToolHandler for UpdateLead {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: Map<String, Value> = decode_arguments("update_lead", arguments)?;

        let mut updates = CollectedFields::new();
        let mut lead = Map::new();
        for field in LEAD_FIELDS {
            let value = match params.get(*field).and_then(Value::as_str) {
                Some(text) => {
                    let value = Value::String(text.trim().to_string());
                    updates.insert(field.to_string(), value.clone());
                    value
                }
                None => match ctx.session.field(field) {
                    Some(value) => value.clone(),
                    None => continue,
                },
            };
            lead.insert(field.to_string(), value);
        }

        let missing: Vec<&str> = LEAD_FIELDS[..REQUIRED]
            .iter()
            .copied()
            .filter(|field| !lead.contains_key(*field))
            .collect();
        let outcome = ToolOutcome::reply(json!({"lead": lead, "missing": missing}));
        Ok(updates
            .into_iter()
            .fold(outcome, |outcome, (field, value)| outcome.with_field(&field, value)))
    }
}

struct SaveLead;

#[async_trait]
impl ToolHandler for SaveLead {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: SaveLeadParams = decode_arguments("save_lead", arguments)?;
        if ctx.session.has_field("lead_saved") {
            return Ok(ToolOutcome::reply(json!({"saved": true, "already_saved": true})));
        }

        let mut payload = Map::new();
        for (index, field) in LEAD_FIELDS.iter().enumerate() {
            match ctx.session.field(field) {
                Some(value) => {
                    payload.insert(field.to_string(), value.clone());
                }
                None if index < REQUIRED => return Err(missing_field("save_lead", field)),
                None => {}
            }
        }
        payload.insert("summary".to_string(), Value::String(params.summary));

        let record_id = ctx.append(record_kinds::LEAD, Value::Object(payload)).await?;
        Ok(ToolOutcome::reply(json!({"saved": true, "record_id": record_id}))
            .with_field("lead_saved", true)
            .with_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tools::testing::Harness;
    use crate::domain::foundation::AgentVariant;

    #[tokio::test]
    async fn search_faq_answers_from_content() {
        let harness = Harness::new(AgentVariant::LeadCapture);
        let session = harness.session("discovery", &[]);

        let outcome = harness
            .call(&session, "search_faq", json!({"question": "Is my money safe with you?"}))
            .await
            .unwrap();

        assert_eq!(outcome.data()["found"], true);
        assert_eq!(outcome.data()["question"], "Is my money safe?");
    }

    #[tokio::test]
    async fn search_faq_without_match_says_so() {
        let harness = Harness::new(AgentVariant::LeadCapture);
        let session = harness.session("discovery", &[]);

        let outcome = harness
            .call(&session, "search_faq", json!({"question": "zzz qqq"}))
            .await
            .unwrap();
        assert_eq!(outcome.data()["found"], false);
    }

    #[tokio::test]
    async fn update_lead_reports_missing_required_fields() {
        let harness = Harness::new(AgentVariant::LeadCapture);
        let session = harness.session("discovery", &[("name", json!("Asha"))]);

        let outcome = harness
            .call(&session, "update_lead", json!({"company": "Acme", "contact": "asha@acme.test"}))
            .await
            .unwrap();

        assert_eq!(outcome.field_updates().len(), 2);
        assert_eq!(outcome.data()["lead"]["name"], "Asha");
        assert_eq!(outcome.data()["missing"], json!(["interest"]));
    }

    #[tokio::test]
    async fn update_lead_rejects_unknown_fields() {
        let harness = Harness::new(AgentVariant::LeadCapture);
        let session = harness.session("discovery", &[]);

        let result = harness.call(&session, "update_lead", json!({"budget": "big"})).await;
        assert!(matches!(result, Err(DialogueError::InvalidArguments { .. })));
    }

    #[tokio::test]
    async fn save_lead_appends_once() {
        let harness = Harness::new(AgentVariant::LeadCapture);
        let session = harness.session(
            "wrap_up",
            &[
                ("name", json!("Asha")),
                ("contact", json!("asha@acme.test")),
                ("interest", json!("team plan")),
            ],
        );

        let outcome = harness
            .call(&session, "save_lead", json!({"summary": "Wants the team plan."}))
            .await
            .unwrap();
        assert_eq!(outcome.records_appended(), 1);

        let saved = session.with_pending_fields(outcome.field_updates());
        let again = harness
            .call(&saved, "save_lead", json!({"summary": "Wants the team plan."}))
            .await
            .unwrap();
        assert_eq!(again.data()["already_saved"], true);
        assert_eq!(harness.store.records(AgentVariant::LeadCapture).await.len(), 1);
    }

    #[tokio::test]
    async fn save_lead_requires_contact() {
        let harness = Harness::new(AgentVariant::LeadCapture);
        let session = harness.session("wrap_up", &[("name", json!("Asha")), ("interest", json!("demo"))]);

        let err = harness
            .call(&session, "save_lead", json!({"summary": "Demo."}))
            .await
            .unwrap_err();
        match err {
            DialogueError::InvalidArguments { field, .. } => assert_eq!(field, "contact"),
            other => panic!("expected InvalidArguments, got {:?}", other),
        }
    }
}
