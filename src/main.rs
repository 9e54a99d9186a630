//! voice-flows binary - a line-oriented stand-in for the voice pipeline.
//!
//! Reads one utterance event per stdin line and writes one assistant turn
//! per stdout line. A line is either plain text (an utterance for the
//! current session) or a JSON event:
//!
//! ```text
//! {"text": "a medium latte", "tool_calls": [{"name": "update_order", "arguments": {"size": "medium"}}]}
//! {"variant": "wellness_check_in", "user_id": "caller-42"}    starts a new session
//! ```
//!
//! Once the current session ends, the next plain line opens a fresh
//! session of the default variant.
//!
//! Logs go to stderr so stdout carries only turns.

use serde::{Deserialize, Serialize};
use std::error::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use voice_flows::application::{
    ProcessTurnCommand, ProcessTurnHandler, StartSessionCommand, StartSessionHandler, VoiceFlowsRuntime,
};
use voice_flows::config::{AppConfig, LoggingConfig};
use voice_flows::domain::conversation::tools::{ToolCall, ToolResponse};
use voice_flows::domain::conversation::{DialogueError, PromptContext};
use voice_flows::domain::foundation::{AgentVariant, SessionId, UserId};

/// Inbound event from the voice pipeline.
#[derive(Debug, Default, Deserialize)]
struct UtteranceEvent {
    session_id: Option<SessionId>,
    #[serde(default)]
    text: String,
    timestamp: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
    #[serde(default)]
    end: bool,
    /// Set (without `session_id`) to start a new session.
    variant: Option<AgentVariant>,
    user_id: Option<String>,
}

impl UtteranceEvent {
    fn parse(line: &str) -> Self {
        serde_json::from_str(line).unwrap_or_else(|_| Self {
            text: line.to_string(),
            ..Self::default()
        })
    }

    fn starts_session(&self) -> bool {
        self.session_id.is_none() && (self.variant.is_some() || self.user_id.is_some())
    }
}

/// Outbound turn for the voice pipeline to speak.
#[derive(Debug, Serialize)]
struct AssistantTurn {
    session_id: SessionId,
    text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ToolResponse>,
    prompt: PromptContext,
}

#[derive(Debug, Serialize)]
struct TurnError {
    session_id: Option<SessionId>,
    error: String,
    message: String,
    hint: &'static str,
}

impl TurnError {
    fn new(session_id: Option<SessionId>, err: &DialogueError) -> Self {
        Self {
            session_id,
            error: err.code().to_string(),
            message: err.to_string(),
            hint: err.retry_hint(),
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

struct Pipeline {
    default_variant: AgentVariant,
    start: StartSessionHandler,
    turns: ProcessTurnHandler,
    current: Option<SessionId>,
}

impl Pipeline {
    async fn start_session(&mut self, variant: Option<AgentVariant>, user_id: Option<String>) -> Result<String, DialogueError> {
        let user_id = user_id
            .map(UserId::new)
            .transpose()
            .map_err(|e| DialogueError::invalid_arguments("start_session", e))?;
        let result = self
            .start
            .handle(StartSessionCommand {
                variant: variant.unwrap_or(self.default_variant),
                user_id,
            })
            .await?;

        self.current = Some(result.session.id());
        to_line(&AssistantTurn {
            session_id: result.session.id(),
            text: result.prompt.directive.clone(),
            tool_calls: Vec::new(),
            prompt: result.prompt,
        })
    }

    async fn handle_line(&mut self, line: &str) -> String {
        let event = UtteranceEvent::parse(line);
        let session_id = event.session_id.or(self.current);

        let result = if event.starts_session() {
            self.start_session(event.variant, event.user_id).await
        } else {
            match session_id {
                Some(id) => self.process(id, event).await,
                None => self.start_session(None, None).await,
            }
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(session_id = ?session_id, error = %e, "Turn failed");
            to_line(&TurnError::new(session_id, &e)).unwrap_or_default()
        })
    }

    async fn process(&mut self, session_id: SessionId, event: UtteranceEvent) -> Result<String, DialogueError> {
        tracing::debug!(session_id = %session_id, at = ?event.timestamp, "Utterance received");
        let mut cmd = ProcessTurnCommand::new(session_id).with_utterance(event.text);
        cmd.tool_calls = event.tool_calls;
        cmd.exit_requested = event.end;

        let report = self.turns.handle(cmd).await?;
        if report.ended() {
            tracing::info!(session_id = %session_id, phase = %report.prompt.phase, "Session ended");
            if self.current == Some(session_id) {
                self.current = None;
            }
        }
        to_line(&AssistantTurn {
            session_id,
            text: report.prompt.directive.clone(),
            tool_calls: report.tool_results,
            prompt: report.prompt,
        })
    }
}

fn to_line<T: Serialize>(value: &T) -> Result<String, DialogueError> {
    serde_json::to_string(value).map_err(|e| DialogueError::internal(e.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging);

    tracing::info!(
        variant = %config.agent.variant,
        data_dir = %config.storage.data_dir.display(),
        content_dir = %config.storage.content_dir.display(),
        "Starting voice-flows"
    );

    let runtime = VoiceFlowsRuntime::from_config(&config).await?;
    let mut pipeline = Pipeline {
        default_variant: config.agent.variant,
        start: runtime.start_session_handler(),
        turns: runtime.process_turn_handler(),
        current: None,
    };

    let mut stdout = tokio::io::stdout();
    let greeting = pipeline.start_session(None, None).await?;
    stdout.write_all(format!("{}\n", greeting).as_bytes()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = pipeline.handle_line(line).await;
        stdout.write_all(format!("{}\n", reply).as_bytes()).await?;
        stdout.flush().await?;
    }

    tracing::info!(
        active = runtime.controller().active_count().await,
        archived = runtime.controller().archived_count().await,
        "Input closed; shutting down"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::Arc;
    use tempfile::TempDir;
    use voice_flows::adapters::{FileContentSource, InMemoryRecordStore};

    async fn pipeline(content_dir: &TempDir) -> Pipeline {
        let runtime = VoiceFlowsRuntime::build(
            Arc::new(InMemoryRecordStore::new()),
            &FileContentSource::new(content_dir.path()),
        )
        .await
        .unwrap();
        Pipeline {
            default_variant: AgentVariant::Starter,
            start: runtime.start_session_handler(),
            turns: runtime.process_turn_handler(),
            current: None,
        }
    }

    fn parse(line: &str) -> Value {
        serde_json::from_str(line).unwrap()
    }

    #[tokio::test]
    async fn plain_text_after_an_ended_session_starts_a_new_one() {
        let content_dir = TempDir::new().unwrap();
        let mut pipeline = pipeline(&content_dir).await;
        pipeline.start_session(None, None).await.unwrap();
        let first = pipeline.current.unwrap();

        let farewell = parse(&pipeline.handle_line("goodbye").await);
        assert!(farewell.get("error").is_none());
        assert_eq!(farewell["prompt"]["phase"], "ended_early");
        assert!(pipeline.current.is_none());

        let reply = parse(&pipeline.handle_line("hello again").await);
        assert!(reply.get("error").is_none());
        let second = pipeline.current.unwrap();
        assert_ne!(second, first);
        assert_eq!(reply["session_id"], json_id(second));
    }

    #[tokio::test]
    async fn addressing_an_ended_session_explicitly_is_an_error() {
        let content_dir = TempDir::new().unwrap();
        let mut pipeline = pipeline(&content_dir).await;
        pipeline.start_session(None, None).await.unwrap();
        let first = pipeline.current.unwrap();
        pipeline.handle_line("goodbye").await;

        let line = format!(r#"{{"session_id": {}, "text": "hello"}}"#, json_id(first));
        let reply = parse(&pipeline.handle_line(&line).await);
        assert_eq!(reply["error"], DialogueError::SessionClosed(first).code().to_string());
    }

    fn json_id(id: SessionId) -> Value {
        serde_json::to_value(id).unwrap()
    }
}
