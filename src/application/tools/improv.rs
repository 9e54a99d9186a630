//! Improv Battle Tools - Player setup, scenarios and round records.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::ToolDispatcher;
use crate::domain::conversation::tools::{ArgumentSchema, ParamKind, ToolDefinition, ToolOutcome};
use crate::domain::conversation::{record_kinds, DialogueError, PhaseId};
use crate::ports::{decode_arguments, ToolContext, ToolHandler};

pub const TOOLS: &[&str] = &["start_game", "get_next_scenario", "record_round", "end_game"];

const ROUNDS: &[&str] = &["round_1", "round_2", "round_3"];

#[derive(Debug, Clone, Deserialize)]
pub struct StartGameParams {
    pub player_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordRoundParams {
    pub scenario_id: Option<String>,
    pub host_reaction: String,
    pub player_performance_notes: Option<String>,
}

pub fn register(dispatcher: &mut ToolDispatcher) -> Result<(), DialogueError> {
    dispatcher.register(
        ToolDefinition::new(
            "start_game",
            "Record the player's name and start the first round.",
            ArgumentSchema::empty().required("player_name", ParamKind::String, "Name the player gave"),
        ),
        &["intro"],
        Arc::new(StartGame),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "get_next_scenario",
            "Get the scene to set up for the current round.",
            ArgumentSchema::empty(),
        ),
        ROUNDS,
        Arc::new(GetNextScenario),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "record_round",
            "Save the host's reaction to the round the player just performed.",
            ArgumentSchema::empty()
                .optional("scenario_id", ParamKind::String, "Scenario played; defaults to the current one")
                .required("host_reaction", ParamKind::String, "What the host said about the performance")
                .optional("player_performance_notes", ParamKind::String, "Notes on the player's style"),
        ),
        ROUNDS,
        Arc::new(RecordRound),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "end_game",
            "End the show early when the player asks to stop.",
            ArgumentSchema::empty(),
        ),
        &["intro", "round_1", "round_2", "round_3", "summary"],
        Arc::new(EndGame),
    )
}

/// 1-based round number of a `round_N` phase.
fn round_number(phase: &PhaseId) -> Option<usize> {
    phase
        .as_str()
        .strip_prefix("round_")
        .and_then(|n| n.parse().ok())
        .filter(|n| *n > 0)
}

struct StartGame;

#[async_trait]
impl ToolHandler for StartGame {
    async fn call(&self, _ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: StartGameParams = decode_arguments("start_game", arguments)?;
        let name = params.player_name.trim();
        Ok(ToolOutcome::reply(json!({"player_name": name, "rounds": ROUNDS.len()}))
            .with_field("player_name", name))
    }
}

struct GetNextScenario;

#[async_trait]
impl ToolHandler for GetNextScenario {
    async fn call(&self, ctx: &ToolContext<'_>, _arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let round = round_number(ctx.session.phase())
            .ok_or_else(|| DialogueError::internal(format!("'{}' is not a round", ctx.session.phase())))?;
        let scenarios: Vec<_> = ctx.content.scenarios(ctx.session.variant()).collect();
        if scenarios.is_empty() {
            return Err(DialogueError::internal("no improv scenarios are loaded"));
        }

        let scenario = scenarios[(round - 1) % scenarios.len()];
        Ok(ToolOutcome::reply(json!({
            "round": round,
            "scenario_id": scenario.id,
            "prompt": scenario.prompt,
        }))
        .with_field("current_scenario", scenario.id.as_str()))
    }
}

struct RecordRound;

#[async_trait]
impl ToolHandler for RecordRound {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: RecordRoundParams = decode_arguments("record_round", arguments)?;
        let round = round_number(ctx.session.phase())
            .ok_or_else(|| DialogueError::internal(format!("'{}' is not a round", ctx.session.phase())))?;
        let scenario_id = params
            .scenario_id
            .or_else(|| ctx.session.field_str("current_scenario").map(str::to_string));

        let payload = json!({
            "player_name": ctx.session.field("player_name"),
            "round_number": round,
            "scenario_id": scenario_id,
            "host_reaction": params.host_reaction,
            "player_performance_notes": params.player_performance_notes,
        });
        let record_id = ctx.append(record_kinds::IMPROV_ROUND, payload).await?;

        Ok(ToolOutcome::reply(json!({"recorded": true, "round": round, "record_id": record_id})).with_record())
    }
}

struct EndGame;

#[async_trait]
impl ToolHandler for EndGame {
    async fn call(&self, _ctx: &ToolContext<'_>, _arguments: Value) -> Result<ToolOutcome, DialogueError> {
        Ok(ToolOutcome::reply(json!({"ending": true})).requesting_exit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tools::testing::Harness;
    use crate::domain::foundation::AgentVariant;

    #[test]
    fn round_numbers_come_from_phase_names() {
        assert_eq!(round_number(&PhaseId::new("round_2")), Some(2));
        assert_eq!(round_number(&PhaseId::new("summary")), None);
        assert_eq!(round_number(&PhaseId::new("round_0")), None);
    }

    #[tokio::test]
    async fn scenarios_follow_round_order() {
        let harness = Harness::new(AgentVariant::ImprovBattle);

        let first = harness
            .call(&harness.session("round_1", &[]), "get_next_scenario", json!({}))
            .await
            .unwrap();
        let third = harness
            .call(&harness.session("round_3", &[]), "get_next_scenario", json!({}))
            .await
            .unwrap();

        assert_eq!(first.data()["scenario_id"], "barista_portal");
        assert_eq!(third.field_updates()["current_scenario"], "escaped_order");
    }

    #[tokio::test]
    async fn record_round_defaults_to_current_scenario() {
        let harness = Harness::new(AgentVariant::ImprovBattle);
        let session = harness.session(
            "round_2",
            &[("player_name", json!("Sam")), ("current_scenario", json!("time_travel_guide"))],
        );

        harness
            .call(&session, "record_round", json!({"host_reaction": "Committed, if a little rushed."}))
            .await
            .unwrap();

        let records = harness.store.records(AgentVariant::ImprovBattle).await;
        assert_eq!(records[0].payload["round_number"], 2);
        assert_eq!(records[0].payload["scenario_id"], "time_travel_guide");
        assert_eq!(records[0].payload["player_name"], "Sam");
    }

    #[tokio::test]
    async fn end_game_requests_exit() {
        let harness = Harness::new(AgentVariant::ImprovBattle);
        let outcome = harness
            .call(&harness.session("intro", &[]), "end_game", json!({}))
            .await
            .unwrap();
        assert!(outcome.exit_requested());
    }

    #[tokio::test]
    async fn scenario_tools_are_closed_outside_rounds() {
        let harness = Harness::new(AgentVariant::ImprovBattle);
        let result = harness
            .call(&harness.session("summary", &[]), "get_next_scenario", json!({}))
            .await;
        assert!(matches!(result, Err(DialogueError::ToolNotAllowedInPhase { .. })));
    }
}
