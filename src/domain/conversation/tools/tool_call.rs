//! Tool call, outcome and response value objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::conversation::{CollectedFields, DialogueError};

/// A request from the conversation driver to invoke a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &Value {
        &self.arguments
    }

    pub fn into_arguments(self) -> Value {
        self.arguments
    }
}

/// What a handler produced.
///
/// `field_updates` are merged into the session when the turn advances;
/// `data` goes back to the conversation driver as the tool's result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutcome {
    data: Value,
    field_updates: CollectedFields,
    records_appended: u32,
    exit_requested: bool,
}

impl ToolOutcome {
    pub fn reply(data: Value) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.field_updates.insert(name.to_string(), value.into());
        self
    }

    /// Notes that the handler appended one record to storage.
    pub fn with_record(mut self) -> Self {
        self.records_appended += 1;
        self
    }

    /// Asks the turn to end the session through the exit path.
    pub fn requesting_exit(mut self) -> Self {
        self.exit_requested = true;
        self
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn field_updates(&self) -> &CollectedFields {
        &self.field_updates
    }

    pub fn into_field_updates(self) -> CollectedFields {
        self.field_updates
    }

    pub fn records_appended(&self) -> u32 {
        self.records_appended
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

/// Result of one tool call as reported back to the conversation driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    tool: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl ToolResponse {
    pub fn success(tool: impl Into<String>, data: Value) -> Self {
        Self {
            tool: tool.into(),
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
            hint: None,
        }
    }

    /// A rejected call carrying a "try again" hint.
    pub fn rejected(tool: impl Into<String>, error: &DialogueError) -> Self {
        Self {
            tool: tool.into(),
            success: false,
            data: None,
            error: Some(error.to_string()),
            error_code: Some(error.code().to_string()),
            hint: Some(error.retry_hint().to_string()),
        }
    }

    /// A call dropped because the session was already exiting.
    pub fn skipped(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            success: false,
            data: None,
            error: Some("skipped: the conversation is ending".to_string()),
            error_code: None,
            hint: None,
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_call_deserializes_without_arguments() {
        let call: ToolCall = serde_json::from_str(r#"{"name": "show_cart"}"#).unwrap();
        assert_eq!(call.name(), "show_cart");
        assert!(call.arguments().is_null());
    }

    #[test]
    fn outcome_accumulates_updates_and_records() {
        let outcome = ToolOutcome::reply(json!({"ok": true}))
            .with_field("order_placed", true)
            .with_record();

        assert_eq!(outcome.field_updates()["order_placed"], json!(true));
        assert_eq!(outcome.records_appended(), 1);
        assert!(!outcome.exit_requested());
    }

    #[test]
    fn rejected_response_carries_code_and_hint() {
        let err = DialogueError::UnknownTool("teleport".into());
        let response = ToolResponse::rejected("teleport", &err);

        assert!(!response.is_success());
        assert_eq!(response.error_code(), Some("UNKNOWN_TOOL"));
        assert!(response.hint().is_some());
    }

    #[test]
    fn success_response_omits_error_fields() {
        let json = serde_json::to_value(ToolResponse::success("show_cart", json!({"items": []}))).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
    }
}
