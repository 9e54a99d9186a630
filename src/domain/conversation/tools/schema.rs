//! Argument schemas for tools.
//!
//! A schema is the single source for both validation of incoming
//! arguments and the JSON Schema advertised to the conversation driver.

use serde_json::{json, Map, Value};

use crate::domain::foundation::ValidationError;

/// Type of a single tool argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    String,
    Integer { min: i64, max: i64 },
    Number { min: f64, max: f64 },
    Boolean,
    StringList,
    Choice(&'static [&'static str]),
}

impl ParamKind {
    fn json_schema(&self) -> Value {
        match self {
            ParamKind::String => json!({"type": "string"}),
            ParamKind::Integer { min, max } => {
                json!({"type": "integer", "minimum": min, "maximum": max})
            }
            ParamKind::Number { min, max } => {
                json!({"type": "number", "minimum": min, "maximum": max})
            }
            ParamKind::Boolean => json!({"type": "boolean"}),
            ParamKind::StringList => json!({"type": "array", "items": {"type": "string"}}),
            ParamKind::Choice(choices) => json!({"type": "string", "enum": choices}),
        }
    }

    fn check(&self, field: &str, required: bool, value: &Value) -> Result<(), ValidationError> {
        match self {
            ParamKind::String => match value.as_str() {
                Some(s) if required && s.trim().is_empty() => Err(ValidationError::empty_field(field)),
                Some(_) => Ok(()),
                None => Err(ValidationError::invalid_format(field, "must be a string")),
            },
            ParamKind::Integer { min, max } => {
                let n = value
                    .as_i64()
                    .ok_or_else(|| ValidationError::invalid_format(field, "must be an integer"))?;
                if n < *min || n > *max {
                    return Err(ValidationError::out_of_range(field, *min, *max, n));
                }
                Ok(())
            }
            ParamKind::Number { min, max } => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| ValidationError::invalid_format(field, "must be a number"))?;
                if n < *min || n > *max {
                    return Err(ValidationError::invalid_format(
                        field,
                        format!("must be between {} and {}", min, max),
                    ));
                }
                Ok(())
            }
            ParamKind::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(ValidationError::invalid_format(field, "must be true or false"))
                }
            }
            ParamKind::StringList => {
                let all_strings = value
                    .as_array()
                    .map_or(false, |items| items.iter().all(Value::is_string));
                if all_strings {
                    Ok(())
                } else {
                    Err(ValidationError::invalid_format(field, "must be a list of strings"))
                }
            }
            ParamKind::Choice(choices) => match value.as_str() {
                Some(s) if choices.iter().any(|choice| *choice == s) => Ok(()),
                _ => Err(ValidationError::invalid_format(
                    field,
                    format!("must be one of {}", choices.join(", ")),
                )),
            },
        }
    }
}

/// One declared argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: &'static str,
    kind: ParamKind,
    required: bool,
    description: &'static str,
}

impl Param {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Declared arguments of a tool.
///
/// Unknown keys are rejected; `null` is treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSchema {
    params: Vec<Param>,
}

impl ArgumentSchema {
    /// A schema that accepts no arguments.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn required(self, name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        self.with_param(name, kind, true, description)
    }

    pub fn optional(self, name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        self.with_param(name, kind, false, description)
    }

    fn with_param(
        mut self,
        name: &'static str,
        kind: ParamKind,
        required: bool,
        description: &'static str,
    ) -> Self {
        self.params.push(Param {
            name,
            kind,
            required,
            description,
        });
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Validates arguments, naming the first offending field.
    pub fn validate(&self, arguments: &Value) -> Result<(), ValidationError> {
        let empty = Map::new();
        let object = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(ValidationError::invalid_format(
                    "arguments",
                    "must be a JSON object",
                ))
            }
        };

        if let Some(unknown) = object
            .keys()
            .find(|key| !self.params.iter().any(|p| p.name == key.as_str()))
        {
            return Err(ValidationError::invalid_format(
                unknown.as_str(),
                "is not a recognised argument",
            ));
        }

        for param in &self.params {
            match object.get(param.name).filter(|v| !v.is_null()) {
                Some(value) => param.kind.check(param.name, param.required, value)?,
                None if param.required => return Err(ValidationError::empty_field(param.name)),
                None => {}
            }
        }
        Ok(())
    }

    /// JSON Schema rendering for tool-calling APIs.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            let mut schema = param.kind.json_schema();
            if let Value::Object(map) = &mut schema {
                map.insert("description".to_string(), json!(param.description));
            }
            properties.insert(param.name.to_string(), schema);
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }
}
