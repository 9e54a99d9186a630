//! Fitness Tools - Workout logging.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::ToolDispatcher;
use crate::domain::conversation::tools::{ArgumentSchema, ParamKind, ToolDefinition, ToolOutcome};
use crate::domain::conversation::{record_kinds, DialogueError};
use crate::domain::records::RecordFilter;
use crate::ports::{decode_arguments, ToolContext, ToolHandler};

pub const TOOLS: &[&str] = &["log_workout", "recall_last_workout"];

#[derive(Debug, Clone, Deserialize)]
pub struct LogWorkoutParams {
    pub exercise: String,
    pub duration_minutes: u32,
    pub notes: Option<String>,
}

pub fn register(dispatcher: &mut ToolDispatcher) -> Result<(), DialogueError> {
    dispatcher.register(
        ToolDefinition::new(
            "log_workout",
            "Save a workout the user completed.",
            ArgumentSchema::empty()
                .required("exercise", ParamKind::String, "What they did, e.g. running, yoga")
                .required(
                    "duration_minutes",
                    ParamKind::Integer { min: 1, max: 600 },
                    "How long it lasted, in minutes",
                )
                .optional("notes", ParamKind::String, "Anything else worth remembering"),
        ),
        &["greeting", "logging"],
        Arc::new(LogWorkout),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "recall_last_workout",
            "Look up the user's most recent logged workout.",
            ArgumentSchema::empty(),
        ),
        &["greeting", "logging"],
        Arc::new(RecallLastWorkout),
    )
}

struct LogWorkout;

#[async_trait]
impl ToolHandler for LogWorkout {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: LogWorkoutParams = decode_arguments("log_workout", arguments)?;
        let payload = json!({
            "exercise": params.exercise.trim(),
            "duration": params.duration_minutes,
            "notes": params.notes.as_deref().unwrap_or(""),
        });

        let record_id = ctx.append(record_kinds::WORKOUT, payload.clone()).await?;
        Ok(ToolOutcome::reply(json!({"logged": payload, "record_id": record_id}))
            .with_field("workout_logged", true)
            .with_record())
    }
}

struct RecallLastWorkout;

#[async_trait]
impl ToolHandler for RecallLastWorkout {
    async fn call(&self, ctx: &ToolContext<'_>, _arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let filter = RecordFilter::of_kind(record_kinds::WORKOUT).for_user(ctx.session.user_id().cloned());
        let latest = ctx.store.read_latest(ctx.session.variant(), &filter).await?;

        Ok(ToolOutcome::reply(match latest {
            Some(record) => json!({"found": true, "workout": record.payload}),
            None => json!({"found": false, "message": "No workouts logged yet."}),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tools::testing::Harness;
    use crate::domain::foundation::AgentVariant;

    #[tokio::test]
    async fn log_then_recall() {
        let harness = Harness::new(AgentVariant::FitnessLog);
        let session = harness.session_for("sam", "logging");

        harness
            .call(&session, "log_workout", json!({"exercise": "cycling", "duration_minutes": 45}))
            .await
            .unwrap();
        let outcome = harness.call(&session, "recall_last_workout", json!({})).await.unwrap();

        assert_eq!(outcome.data()["workout"]["exercise"], "cycling");
        assert_eq!(outcome.data()["workout"]["duration"], 45);
        assert_eq!(outcome.data()["workout"]["notes"], "");
    }

    #[tokio::test]
    async fn duration_out_of_range_is_rejected() {
        let harness = Harness::new(AgentVariant::FitnessLog);
        let session = harness.session("logging", &[]);

        let result = harness
            .call(&session, "log_workout", json!({"exercise": "running", "duration_minutes": 0}))
            .await;
        assert!(matches!(result, Err(DialogueError::InvalidArguments { .. })));
        assert!(harness.store.records(AgentVariant::FitnessLog).await.is_empty());
    }

    #[tokio::test]
    async fn recall_with_no_history() {
        let harness = Harness::new(AgentVariant::FitnessLog);
        let session = harness.session("greeting", &[]);

        let outcome = harness.call(&session, "recall_last_workout", Value::Null).await.unwrap();
        assert_eq!(outcome.data()["found"], false);
    }
}
