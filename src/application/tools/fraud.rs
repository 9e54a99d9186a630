//! Fraud Alert Tools - Case lookup, identity challenge and case outcome.
//!
//! Case files are read-only content. Outcomes are appended as records
//! rather than written back into the case.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::tools::missing_field;
use crate::application::ToolDispatcher;
use crate::domain::content::{ContentLibrary, FraudCase};
use crate::domain::conversation::tools::{ArgumentSchema, ParamKind, ToolDefinition, ToolOutcome};
use crate::domain::conversation::{record_kinds, DialogueError, Session};
use crate::domain::foundation::Timestamp;
use crate::ports::{decode_arguments, ToolContext, ToolHandler};

pub const TOOLS: &[&str] = &["load_case", "verify_answer", "update_case_status"];

pub const CASE_STATUSES: &[&str] = &["confirmed_safe", "confirmed_fraud", "verification_failed"];

#[derive(Debug, Clone, Deserialize)]
pub struct LoadCaseParams {
    pub user_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyAnswerParams {
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCaseStatusParams {
    pub status: String,
    pub note: Option<String>,
}

pub fn register(dispatcher: &mut ToolDispatcher) -> Result<(), DialogueError> {
    dispatcher.register(
        ToolDefinition::new(
            "load_case",
            "Find the open fraud case for the customer's first name.",
            ArgumentSchema::empty().required("user_name", ParamKind::String, "Customer's first name"),
        ),
        &["greeting", "identify"],
        Arc::new(LoadCase),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "verify_answer",
            "Check the customer's answer to the security question on the case.",
            ArgumentSchema::empty().required("answer", ParamKind::String, "Answer as spoken by the customer"),
        ),
        &["verify"],
        Arc::new(VerifyAnswer),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "update_case_status",
            "Record the customer's answer about the suspicious transaction.",
            ArgumentSchema::empty()
                .required("status", ParamKind::Choice(CASE_STATUSES), "Outcome of the review")
                .optional("note", ParamKind::String, "Short note for the case file"),
        ),
        &["review"],
        Arc::new(UpdateCaseStatus),
    )
}

fn case_for_session<'a>(content: &'a ContentLibrary, session: &Session, tool: &str) -> Result<&'a FraudCase, DialogueError> {
    let case_id = session
        .field_str("case_id")
        .ok_or_else(|| missing_field(tool, "case_id"))?;
    content
        .fraud_cases(session.variant())
        .find(|case| case.case_id == case_id)
        .ok_or_else(|| DialogueError::internal(format!("case {} is not in the content library", case_id)))
}

fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

struct LoadCase;

#[async_trait]
impl ToolHandler for LoadCase {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: LoadCaseParams = decode_arguments("load_case", arguments)?;
        let name = params.user_name.trim();

        let found = ctx
            .content
            .fraud_cases(ctx.session.variant())
            .find(|case| case.user_name.eq_ignore_ascii_case(name));

        Ok(match found {
            Some(case) => ToolOutcome::reply(json!({
                "found": true,
                "case_id": case.case_id,
                "security_question": case.security_question,
                "card_ending": case.card_ending,
            }))
            .with_field("case_id", case.case_id.as_str())
            .with_field("user_name", case.user_name.as_str())
            .with_field("security_question", case.security_question.as_str()),
            None => ToolOutcome::reply(json!({
                "found": false,
                "message": "No open case under that name. Ask the customer to repeat or spell it.",
            })),
        })
    }
}

struct VerifyAnswer;

#[async_trait]
impl ToolHandler for VerifyAnswer {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: VerifyAnswerParams = decode_arguments("verify_answer", arguments)?;
        let case = case_for_session(ctx.content, ctx.session, "verify_answer")?;

        let verified = normalize_answer(&params.answer) == normalize_answer(&case.security_answer);
        tracing::info!(
            session_id = %ctx.session.id(),
            case_id = %case.case_id,
            verified,
            "Security answer checked"
        );

        let data = if verified {
            json!({"verified": true, "transaction": case.transaction_summary()})
        } else {
            json!({"verified": false})
        };
        Ok(ToolOutcome::reply(data).with_field("verified", verified))
    }
}

struct UpdateCaseStatus;

#[async_trait]
impl ToolHandler for UpdateCaseStatus {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: UpdateCaseStatusParams = decode_arguments("update_case_status", arguments)?;
        let case = case_for_session(ctx.content, ctx.session, "update_case_status")?;

        let payload = json!({
            "case_id": case.case_id,
            "status": params.status,
            "note": params.note.unwrap_or_default(),
            "verified_at": Timestamp::now().to_rfc3339(),
        });
        let record_id = ctx.append(record_kinds::FRAUD_CASE_OUTCOME, payload).await?;

        Ok(ToolOutcome::reply(json!({"status": params.status, "record_id": record_id}))
            .with_field("case_status", params.status)
            .with_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tools::testing::Harness;
    use crate::domain::foundation::AgentVariant;

    #[tokio::test]
    async fn load_case_matches_name_case_insensitively() {
        let harness = Harness::new(AgentVariant::FraudAlert);
        let session = harness.session("identify", &[]);

        let outcome = harness.call(&session, "load_case", json!({"user_name": " priya "})).await.unwrap();

        assert_eq!(outcome.field_updates()["case_id"], "FC-1002");
        assert_eq!(outcome.data()["security_question"], "In which city were you born?");
    }

    #[tokio::test]
    async fn unknown_name_sets_nothing() {
        let harness = Harness::new(AgentVariant::FraudAlert);
        let session = harness.session("identify", &[]);

        let outcome = harness.call(&session, "load_case", json!({"user_name": "Zed"})).await.unwrap();
        assert!(outcome.field_updates().is_empty());
        assert_eq!(outcome.data()["found"], false);
    }

    #[tokio::test]
    async fn verify_answer_ignores_case_and_whitespace() {
        let harness = Harness::new(AgentVariant::FraudAlert);
        let session = harness.session("verify", &[("case_id", json!("FC-1001"))]);

        let outcome = harness
            .call(&session, "verify_answer", json!({"answer": "  st. mary's "}))
            .await
            .unwrap();

        assert_eq!(outcome.field_updates()["verified"], true);
        assert_eq!(outcome.data()["transaction"]["merchant"], "ElectroMart Online");
    }

    #[tokio::test]
    async fn wrong_answer_reveals_nothing() {
        let harness = Harness::new(AgentVariant::FraudAlert);
        let session = harness.session("verify", &[("case_id", json!("FC-1001"))]);

        let outcome = harness
            .call(&session, "verify_answer", json!({"answer": "Delhi Public School"}))
            .await
            .unwrap();

        assert_eq!(outcome.field_updates()["verified"], false);
        assert!(outcome.data().get("transaction").is_none());
    }

    #[tokio::test]
    async fn update_case_status_appends_outcome() {
        let harness = Harness::new(AgentVariant::FraudAlert);
        let session = harness.session("review", &[("case_id", json!("FC-1002")), ("verified", json!(true))]);

        harness
            .call(&session, "update_case_status", json!({"status": "confirmed_fraud", "note": "Card blocked"}))
            .await
            .unwrap();

        let records = harness.store.records(AgentVariant::FraudAlert).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, "fraud_case_outcome");
        assert_eq!(records[0].payload["status"], "confirmed_fraud");
        assert!(records[0].payload["verified_at"].is_string());
    }

    #[tokio::test]
    async fn update_case_status_rejects_unknown_status() {
        let harness = Harness::new(AgentVariant::FraudAlert);
        let session = harness.session("review", &[("case_id", json!("FC-1002"))]);

        let result = harness
            .call(&session, "update_case_status", json!({"status": "maybe"}))
            .await;
        assert!(matches!(result, Err(DialogueError::InvalidArguments { .. })));
    }
}
