//! Tool definition - name, description and argument schema.

use serde::Serialize;
use serde_json::Value;

use super::schema::ArgumentSchema;

/// Definition of a tool the conversation driver may call.
///
/// The JSON Schema rendering is computed once from the argument schema so
/// prompt rendering never rebuilds it.
///
/// ```ignore
/// let definition = ToolDefinition::new(
///     "confirm_order",
///     "Record whether the customer confirmed the order summary",
///     ArgumentSchema::empty().required("confirmed", ParamKind::Boolean, "Customer said yes"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    name: String,
    description: String,
    parameters: Value,
    #[serde(skip)]
    arguments: ArgumentSchema,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        arguments: ArgumentSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: arguments.to_json_schema(),
            arguments,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// JSON Schema for the parameters.
    pub fn parameters_schema(&self) -> &Value {
        &self.parameters
    }

    pub fn arguments(&self) -> &ArgumentSchema {
        &self.arguments
    }

    /// Converts to OpenAI function-calling format.
    pub fn to_openai_format(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters
            }
        })
    }

    /// Converts to Anthropic tool format.
    pub fn to_anthropic_format(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.parameters
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::tools::ParamKind;

    fn confirm_order() -> ToolDefinition {
        ToolDefinition::new(
            "confirm_order",
            "Record the customer's answer to the order summary",
            ArgumentSchema::empty().required("confirmed", ParamKind::Boolean, "Customer said yes"),
        )
    }

    #[test]
    fn computes_parameters_schema_from_arguments() {
        let def = confirm_order();
        assert_eq!(def.parameters_schema()["properties"]["confirmed"]["type"], "boolean");
        assert_eq!(def.parameters_schema()["required"][0], "confirmed");
    }

    #[test]
    fn openai_format_wraps_function() {
        let json = confirm_order().to_openai_format();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "confirm_order");
        assert!(json["function"]["parameters"].is_object());
    }

    #[test]
    fn anthropic_format_uses_input_schema() {
        let json = confirm_order().to_anthropic_format();
        assert_eq!(json["name"], "confirm_order");
        assert!(json["input_schema"].is_object());
    }

    #[test]
    fn serializes_without_internal_schema() {
        let json = serde_json::to_value(confirm_order()).unwrap();
        assert_eq!(json["name"], "confirm_order");
        assert!(json.get("arguments").is_none());
        assert!(json["parameters"].is_object());
    }
}
