//! ProcessTurnHandler - Command handler for one conversational turn.
//!
//! A turn is the caller's utterance plus the tool calls the conversation
//! driver decided on. The handler holds the session lock for the whole
//! turn, runs the calls in order, then advances the session with the
//! field updates they produced.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::{AdvanceStatus, SessionController, ToolDispatcher, TurnInput};
use crate::domain::conversation::tools::{ToolCall, ToolResponse};
use crate::domain::conversation::{CollectedFields, DialogueError, PromptContext, Session};
use crate::domain::foundation::{AgentVariant, RecordId, SessionId};

/// Command to process one turn of a session.
#[derive(Debug, Clone, Default)]
pub struct ProcessTurnCommand {
    pub session_id: SessionId,
    pub utterance: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    /// Set when the pipeline already knows the caller hung up.
    pub exit_requested: bool,
}

impl ProcessTurnCommand {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            ..Self::default()
        }
    }

    pub fn with_utterance(mut self, text: impl Into<String>) -> Self {
        self.utterance = Some(text.into());
        self
    }

    pub fn with_call(mut self, call: ToolCall) -> Self {
        self.tool_calls.push(call);
        self
    }
}

/// What happened during a turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub session: Session,
    pub status: AdvanceStatus,
    /// One entry per requested call, in request order.
    pub tool_results: Vec<ToolResponse>,
    /// Record written by the transition itself, if any.
    pub record_id: Option<RecordId>,
    pub prompt: PromptContext,
}

impl TurnReport {
    pub fn ended(&self) -> bool {
        self.session.is_terminal()
    }
}

/// Handler for processing turns.
pub struct ProcessTurnHandler {
    controller: Arc<SessionController>,
    dispatchers: Arc<HashMap<AgentVariant, ToolDispatcher>>,
}

impl ProcessTurnHandler {
    pub fn new(
        controller: Arc<SessionController>,
        dispatchers: Arc<HashMap<AgentVariant, ToolDispatcher>>,
    ) -> Self {
        Self {
            controller,
            dispatchers,
        }
    }

    /// Runs one turn.
    ///
    /// Tool errors are reported per call and never fail the turn, except
    /// `PersistenceUnavailable`, which aborts it with the session untouched.
    /// An exit phrase in the utterance cancels every call of the turn.
    pub async fn handle(&self, cmd: ProcessTurnCommand) -> Result<TurnReport, DialogueError> {
        let mut session = self.controller.checkout(cmd.session_id).await?;
        let variant = session.variant();
        let policy = Arc::clone(self.controller.policy(variant)?);
        let dispatcher = self.dispatchers.get(&variant).ok_or_else(|| {
            DialogueError::invalid_policy(variant, "no tools are registered for this variant")
        })?;

        let mut exit = cmd.exit_requested
            || cmd
                .utterance
                .as_deref()
                .map_or(false, |text| policy.is_exit_utterance(text));

        let mut pending = CollectedFields::new();
        let mut tool_results = Vec::with_capacity(cmd.tool_calls.len());

        for call in cmd.tool_calls {
            if exit {
                tool_results.push(ToolResponse::skipped(call.name()));
                continue;
            }

            let name = call.name().to_string();
            let view = session.with_pending_fields(&pending);
            match dispatcher.invoke(&view, &name, call.into_arguments()).await {
                Ok(outcome) => {
                    exit = outcome.exit_requested();
                    tool_results.push(ToolResponse::success(&name, outcome.data().clone()));
                    pending.extend(outcome.into_field_updates());
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(
                        session_id = %session.id(),
                        phase = %session.phase(),
                        tool = %name,
                        error = %e,
                        "Tool call rejected"
                    );
                    tool_results.push(ToolResponse::rejected(&name, &e));
                }
                Err(e) => {
                    tracing::error!(
                        session_id = %session.id(),
                        tool = %name,
                        error = %e,
                        "Turn aborted"
                    );
                    return Err(e);
                }
            }
        }

        let input = TurnInput {
            field_updates: pending,
            utterance: cmd.utterance,
            exit_requested: exit,
        };
        let outcome = self.controller.advance_locked(&mut session, input).await?;

        let prompt = outcome
            .prompt
            .with_tools(dispatcher.tools_for_phase(outcome.session.phase()));

        Ok(TurnReport {
            session: outcome.session,
            status: outcome.status,
            tool_results,
            record_id: outcome.record_id,
            prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRecordStore;
    use crate::application::tools::register_variant_tools;
    use crate::domain::content::{builtin_content, ContentLibrary};
    use crate::domain::conversation::{policy_for_variant, PhaseId};
    use crate::domain::foundation::SessionStatus;
    use crate::domain::records::RecordFilter;
    use crate::ports::RecordStore;
    use serde_json::json;

    struct Fixture {
        store: InMemoryRecordStore,
        controller: Arc<SessionController>,
        handler: ProcessTurnHandler,
    }

    fn fixture() -> Fixture {
        let store = InMemoryRecordStore::new();
        let shared: Arc<dyn RecordStore> = Arc::new(store.clone());
        let mut content = ContentLibrary::new();
        let mut controller = SessionController::new(shared.clone());
        for variant in AgentVariant::all() {
            content.insert(*variant, builtin_content(*variant));
            controller.register_policy(policy_for_variant(*variant).unwrap());
        }
        let content = Arc::new(content);
        let mut dispatchers = HashMap::new();
        for variant in AgentVariant::all() {
            let mut dispatcher = ToolDispatcher::new(*variant, content.clone(), shared.clone());
            register_variant_tools(&mut dispatcher).unwrap();
            dispatchers.insert(*variant, dispatcher);
        }
        let controller = Arc::new(controller);
        let handler = ProcessTurnHandler::new(controller.clone(), Arc::new(dispatchers));
        Fixture {
            store,
            controller,
            handler,
        }
    }

    async fn session_at(fx: &Fixture, variant: AgentVariant, phase: &str, fields: CollectedFields) -> SessionId {
        let session = Session::at_phase(variant, PhaseId::new(phase), 1, fields);
        let id = session.id();
        fx.controller.resume(session).await.unwrap();
        id
    }

    #[tokio::test]
    async fn tool_updates_drive_the_transition() {
        let fx = fixture();
        let id = session_at(&fx, AgentVariant::CoffeeOrder, "collecting", CollectedFields::new()).await;

        let report = fx
            .handler
            .handle(ProcessTurnCommand::new(id).with_call(ToolCall::new(
                "update_order",
                json!({"drinkType": "latte", "size": "medium", "milk": "oat", "name": "Sam"}),
            )))
            .await
            .unwrap();

        assert_eq!(report.session.phase().as_str(), "confirming");
        assert!(report.tool_results[0].is_success());
        assert!(report.record_id.is_some());
        assert_eq!(report.prompt.tool_names(), vec!["update_order", "confirm_order"]);
    }

    #[tokio::test]
    async fn later_calls_see_earlier_updates() {
        let fx = fixture();
        let id = session_at(&fx, AgentVariant::GroceryOrder, "shopping", CollectedFields::new()).await;

        let report = fx
            .handler
            .handle(
                ProcessTurnCommand::new(id)
                    .with_call(ToolCall::new("add_item", json!({"item": "milk", "quantity": 2})))
                    .with_call(ToolCall::new("show_cart", json!({}))),
            )
            .await
            .unwrap();

        let cart = report.tool_results[1].data().unwrap();
        assert_eq!(cart["items"][0]["id"], "milk");
        assert_eq!(cart["items"][0]["quantity"], 2);
    }

    #[tokio::test]
    async fn rejected_call_does_not_fail_the_turn() {
        let fx = fixture();
        let id = session_at(&fx, AgentVariant::CoffeeOrder, "collecting", CollectedFields::new()).await;

        let report = fx
            .handler
            .handle(
                ProcessTurnCommand::new(id)
                    .with_call(ToolCall::new("confirm_order", json!({"confirmed": true})))
                    .with_call(ToolCall::new("update_order", json!({"size": "huge"}))),
            )
            .await
            .unwrap();

        assert_eq!(report.tool_results[0].error_code(), Some("TOOL_NOT_ALLOWED_IN_PHASE"));
        assert_eq!(report.tool_results[1].error_code(), Some("INVALID_ARGUMENTS"));
        assert_eq!(report.status, AdvanceStatus::Insufficient);
        assert_eq!(report.session.turn_count(), 2);
    }

    #[tokio::test]
    async fn exit_phrase_skips_every_call() {
        let fx = fixture();
        let id = session_at(&fx, AgentVariant::CoffeeOrder, "collecting", CollectedFields::new()).await;

        let report = fx
            .handler
            .handle(
                ProcessTurnCommand::new(id)
                    .with_utterance("Actually never mind, goodbye")
                    .with_call(ToolCall::new(
                        "update_order",
                        json!({"drinkType": "latte", "size": "medium", "milk": "oat", "name": "Sam"}),
                    )),
            )
            .await
            .unwrap();

        assert_eq!(report.session.phase().as_str(), "ended_early");
        assert_eq!(report.session.status(), SessionStatus::EndedEarly);
        assert!(!report.tool_results[0].is_success());
        assert!(fx.store.records(AgentVariant::CoffeeOrder).await.is_empty());
        assert!(report.ended());
    }

    #[tokio::test]
    async fn exit_requesting_tool_skips_the_rest() {
        let fx = fixture();
        let mut fields = CollectedFields::new();
        fields.insert("player_name".into(), json!("Sam"));
        let id = session_at(&fx, AgentVariant::ImprovBattle, "round_2", fields).await;

        let report = fx
            .handler
            .handle(
                ProcessTurnCommand::new(id)
                    .with_call(ToolCall::new("end_game", json!({})))
                    .with_call(ToolCall::new("get_next_scenario", json!({}))),
            )
            .await
            .unwrap();

        assert!(report.tool_results[0].is_success());
        assert!(!report.tool_results[1].is_success());
        assert_eq!(report.session.phase().as_str(), "ended_early");
    }

    #[tokio::test]
    async fn persistence_failure_aborts_turn_and_keeps_state() {
        let fx = fixture();
        let id = session_at(&fx, AgentVariant::FitnessLog, "logging", CollectedFields::new()).await;
        let before = fx.controller.get(id).await.unwrap();
        fx.store.set_available(false);

        let result = fx
            .handler
            .handle(ProcessTurnCommand::new(id).with_call(ToolCall::new(
                "log_workout",
                json!({"exercise": "running", "duration_minutes": 30}),
            )))
            .await;

        assert!(matches!(result, Err(DialogueError::PersistenceUnavailable(_))));
        assert_eq!(fx.controller.get(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn repeated_calls_append_repeatedly() {
        let fx = fixture();
        let id = session_at(&fx, AgentVariant::ImprovBattle, "round_1", CollectedFields::new()).await;
        let round = json!({
            "scenario_id": "barista_portal",
            "host_reaction": "Bold choice.",
        });

        fx.handler
            .handle(
                ProcessTurnCommand::new(id)
                    .with_call(ToolCall::new("record_round", round.clone()))
                    .with_call(ToolCall::new("record_round", round)),
            )
            .await
            .unwrap();

        let count = fx
            .store
            .count(AgentVariant::ImprovBattle, &RecordFilter::of_kind("improv_round"))
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn closed_session_is_rejected() {
        let fx = fixture();
        let id = session_at(&fx, AgentVariant::Starter, "conversation", CollectedFields::new()).await;
        fx.handler
            .handle(ProcessTurnCommand::new(id).with_utterance("goodbye"))
            .await
            .unwrap();

        let result = fx.handler.handle(ProcessTurnCommand::new(id)).await;
        assert!(matches!(result, Err(DialogueError::SessionClosed(_))));
    }
}
