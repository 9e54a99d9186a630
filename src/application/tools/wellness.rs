//! Wellness Tools - Daily mood and goals check-ins.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::tools::missing_field;
use crate::application::ToolDispatcher;
use crate::domain::conversation::tools::{ArgumentSchema, ParamKind, ToolDefinition, ToolOutcome};
use crate::domain::conversation::{record_kinds, DialogueError};
use crate::domain::records::RecordFilter;
use crate::ports::{decode_arguments, ToolContext, ToolHandler};

pub const TOOLS: &[&str] = &["note_mood", "set_goals", "save_wellness_log", "recall_last_check_in"];

#[derive(Debug, Clone, Deserialize)]
pub struct NoteMoodParams {
    pub mood: String,
    pub energy: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetGoalsParams {
    pub goals: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveWellnessLogParams {
    pub summary: String,
}

pub fn register(dispatcher: &mut ToolDispatcher) -> Result<(), DialogueError> {
    dispatcher.register(
        ToolDefinition::new(
            "note_mood",
            "Record how the user says they are feeling today.",
            ArgumentSchema::empty()
                .required("mood", ParamKind::String, "Mood in the user's own words")
                .optional("energy", ParamKind::String, "Energy level, e.g. low, okay, high"),
        ),
        &["check_in"],
        Arc::new(NoteMood),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "set_goals",
            "Record one to three small goals the user wants to work on today.",
            ArgumentSchema::empty().required("goals", ParamKind::StringList, "Goals, one per entry"),
        ),
        &["check_in", "recap"],
        Arc::new(SetGoals),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "save_wellness_log",
            "Save today's check-in once mood and goals have been summarised back to the user.",
            ArgumentSchema::empty().required("summary", ParamKind::String, "One or two sentence recap"),
        ),
        &["recap"],
        Arc::new(SaveWellnessLog),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "recall_last_check_in",
            "Look up the user's previous check-in to reference how they felt last time.",
            ArgumentSchema::empty(),
        ),
        &["greeting", "check_in"],
        Arc::new(RecallLastCheckIn),
    )
}

struct NoteMood;

#[async_trait]
impl ToolHandler for NoteMood {
    async fn call(&self, _ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: NoteMoodParams = decode_arguments("note_mood", arguments)?;
        let mut outcome = ToolOutcome::reply(json!({"mood": params.mood, "energy": params.energy}))
            .with_field("mood", params.mood.trim());
        if let Some(energy) = params.energy {
            outcome = outcome.with_field("energy", energy.trim());
        }
        Ok(outcome)
    }
}

struct SetGoals;

#[async_trait]
impl ToolHandler for SetGoals {
    async fn call(&self, _ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: SetGoalsParams = decode_arguments("set_goals", arguments)?;
        let goals: Vec<String> = params
            .goals
            .iter()
            .map(|goal| goal.trim().to_string())
            .filter(|goal| !goal.is_empty())
            .collect();
        if goals.is_empty() {
            return Err(missing_field("set_goals", "goals"));
        }

        Ok(ToolOutcome::reply(json!({"goals": goals})).with_field("goals", goals))
    }
}

struct SaveWellnessLog;

#[async_trait]
impl ToolHandler for SaveWellnessLog {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: SaveWellnessLogParams = decode_arguments("save_wellness_log", arguments)?;
        let mood = ctx
            .session
            .field("mood")
            .ok_or_else(|| missing_field("save_wellness_log", "mood"))?;
        let goals = ctx
            .session
            .field("goals")
            .ok_or_else(|| missing_field("save_wellness_log", "goals"))?;

        let mut payload = json!({
            "mood": mood,
            "goals": goals,
            "summary": params.summary,
        });
        if let Some(energy) = ctx.session.field("energy") {
            payload["energy"] = energy.clone();
        }

        let record_id = ctx.append(record_kinds::WELLNESS_LOG, payload).await?;
        Ok(ToolOutcome::reply(json!({"saved": true, "record_id": record_id}))
            .with_field("log_saved", true)
            .with_record())
    }
}

struct RecallLastCheckIn;

#[async_trait]
impl ToolHandler for RecallLastCheckIn {
    async fn call(&self, ctx: &ToolContext<'_>, _arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let filter = RecordFilter::of_kind(record_kinds::WELLNESS_LOG).for_user(ctx.session.user_id().cloned());
        let latest = ctx.store.read_latest(ctx.session.variant(), &filter).await?;

        Ok(ToolOutcome::reply(match latest {
            Some(record) => json!({"found": true, "previous": record.payload}),
            None => json!({"found": false}),
        }))
    }
}
