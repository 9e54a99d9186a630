//! Dialogue error taxonomy.

use thiserror::Error;

use crate::domain::foundation::{AgentVariant, ErrorCode, SessionId, ValidationError};

/// Errors raised while driving a session.
///
/// Tool-level errors are recoverable: the turn handler turns them into a
/// "try again" signal for the conversation driver. Persistence failures
/// abort the turn and leave the session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogueError {
    #[error("Invalid arguments for '{tool}': field '{field}' {reason}")]
    InvalidArguments {
        tool: String,
        field: String,
        reason: String,
    },

    #[error("Tool '{tool}' is not allowed in phase '{phase}'")]
    ToolNotAllowedInPhase { tool: String, phase: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Session {0} has already ended")]
    SessionClosed(SessionId),

    #[error("Invalid conversation policy for {variant}: {reason}")]
    InvalidPolicy { variant: AgentVariant, reason: String },

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DialogueError {
    pub fn invalid_arguments(tool: impl Into<String>, error: ValidationError) -> Self {
        let field = error.field().to_string();
        let reason = match &error {
            ValidationError::EmptyField { .. } => "is required".to_string(),
            ValidationError::OutOfRange { min, max, actual, .. } => {
                format!("must be between {} and {}, got {}", min, max, actual)
            }
            ValidationError::InvalidFormat { reason, .. } => reason.clone(),
        };
        DialogueError::InvalidArguments {
            tool: tool.into(),
            field,
            reason,
        }
    }

    pub fn invalid_policy(variant: AgentVariant, reason: impl Into<String>) -> Self {
        DialogueError::InvalidPolicy {
            variant,
            reason: reason.into(),
        }
    }

    pub fn persistence(reason: impl Into<String>) -> Self {
        DialogueError::PersistenceUnavailable(reason.into())
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        DialogueError::Internal(reason.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DialogueError::InvalidArguments { .. } => ErrorCode::InvalidArguments,
            DialogueError::ToolNotAllowedInPhase { .. } => ErrorCode::ToolNotAllowedInPhase,
            DialogueError::UnknownTool(_) => ErrorCode::UnknownTool,
            DialogueError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            DialogueError::SessionClosed(_) => ErrorCode::SessionClosed,
            DialogueError::InvalidPolicy { .. } => ErrorCode::InvalidPolicy,
            DialogueError::PersistenceUnavailable(_) => ErrorCode::PersistenceUnavailable,
            DialogueError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// True if the turn can continue after reporting this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DialogueError::InvalidArguments { .. }
                | DialogueError::ToolNotAllowedInPhase { .. }
                | DialogueError::UnknownTool(_)
                | DialogueError::SessionClosed(_)
                | DialogueError::Internal(_)
        )
    }

    /// Short guidance for the conversation driver after a rejected call.
    pub fn retry_hint(&self) -> &'static str {
        match self {
            DialogueError::InvalidArguments { .. } => {
                "Ask the caller to clarify the missing or invalid detail, then call the tool again."
            }
            DialogueError::ToolNotAllowedInPhase { .. } => {
                "That action is not available yet. Follow the current directive instead."
            }
            DialogueError::UnknownTool(_) => "Use only the tools listed for this phase.",
            DialogueError::SessionClosed(_) => "The conversation has ended. Say goodbye.",
            DialogueError::PersistenceUnavailable(_) => {
                "Saving failed. Apologise and ask the caller to try again shortly."
            }
            DialogueError::SessionNotFound(_)
            | DialogueError::InvalidPolicy { .. }
            | DialogueError::Internal(_) => "Something went wrong on our side. Try again.",
        }
    }
}
