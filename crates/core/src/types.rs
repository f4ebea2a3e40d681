// crates/core/src/types.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RegistryError;

/// Unique, process-wide identifier of a command (e.g. "read_file").
pub type CommandName = String;

/// Category used when a module path is too shallow to derive one.
pub const MISC_CATEGORY: &str = "misc";

/// Module-path segment that commands live under; the segment after it names
/// the category.
pub const CATEGORY_ROOT: &str = "commands";

/// Tool descriptor handed verbatim to a tool-calling LLM.
///
/// Wire shape:
/// `{type: "function", function: {name, description, parameters: {type: "object", properties, required}}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: CommandName,
    pub description: String,
    pub parameters: ParametersSpec,
}

/// Parameter block of a schema. Each property is kept as raw JSON so that
/// `enum`, `default`, `items` and friends survive a round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametersSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl CommandSchema {
    /// Parse and validate a schema authored with `json!`.
    pub fn from_value(value: Value) -> Result<Self, RegistryError> {
        let schema: CommandSchema = serde_json::from_value(value)
            .map_err(|e| RegistryError::MalformedSchema(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn to_value(&self) -> Value {
        // Plain structs of strings and JSON values always serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn description(&self) -> &str {
        &self.function.description
    }

    /// Check the structural invariants of the wire contract.
    ///
    /// - `type` is "function" and `parameters.type` is "object"
    /// - the function name is non-empty
    /// - every required parameter is a declared property
    /// - no required parameter carries a usable (non-null) default
    pub fn validate(&self) -> Result<(), RegistryError> {
        let name = self.name();
        if self.kind != "function" {
            return Err(RegistryError::MalformedSchema(format!(
                "schema for '{}' has type '{}', expected 'function'",
                name, self.kind
            )));
        }
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.function.parameters.kind != "object" {
            return Err(RegistryError::MalformedSchema(format!(
                "parameters of '{}' have type '{}', expected 'object'",
                name, self.function.parameters.kind
            )));
        }

        for param in &self.function.parameters.required {
            let Some(property) = self.function.parameters.properties.get(param) else {
                return Err(RegistryError::MalformedSchema(format!(
                    "'{}' requires undeclared parameter '{}'",
                    name, param
                )));
            };
            if property.get("default").is_some_and(|d| !d.is_null()) {
                return Err(RegistryError::MalformedSchema(format!(
                    "'{}' lists parameter '{}' as required but gives it a default",
                    name, param
                )));
            }
        }

        Ok(())
    }
}

/// Derive a display category from a Rust module path.
///
/// The category is the segment right after [`CATEGORY_ROOT`]
/// (`my_crate::commands::file_ops::read_file` gives `file_ops`). Paths that
/// do not contain it fall back to the second segment, and paths with a single
/// segment fall back to [`MISC_CATEGORY`].
pub fn category_from_module_path(module_path: &str) -> String {
    let segments: Vec<&str> = module_path.split("::").filter(|s| !s.is_empty()).collect();

    if let Some(idx) = segments.iter().position(|s| *s == CATEGORY_ROOT) {
        return segments
            .get(idx + 1)
            .map(|s| s.to_string())
            .unwrap_or_else(|| MISC_CATEGORY.to_string());
    }

    segments
        .get(1)
        .map(|s| s.to_string())
        .unwrap_or_else(|| MISC_CATEGORY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_file_schema() -> Value {
        json!({
            "type": "function",
            "function": {
                "name": "read_file",
                "description": "Read the contents of a file",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string", "description": "Path to the file to read" },
                        "encoding": { "type": "string", "description": "Text encoding", "enum": ["utf-8"], "default": "utf-8" },
                        "limit": { "type": "integer", "description": "Optional limit", "default": null }
                    },
                    "required": ["file_path"]
                }
            }
        })
    }

    #[test]
    fn test_schema_round_trips_unchanged() {
        let raw = read_file_schema();
        let schema = CommandSchema::from_value(raw.clone()).unwrap();
        assert_eq!(schema.to_value(), raw);

        let text = serde_json::to_string(&schema).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_required_param_with_default_rejected() {
        let mut raw = read_file_schema();
        raw["function"]["parameters"]["required"] = json!(["file_path", "encoding"]);
        let err = CommandSchema::from_value(raw).unwrap_err();
        assert!(matches!(err, RegistryError::MalformedSchema(_)));
    }

    #[test]
    fn test_required_param_must_be_declared() {
        let mut raw = read_file_schema();
        raw["function"]["parameters"]["required"] = json!(["path"]);
        assert!(CommandSchema::from_value(raw).is_err());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut raw = read_file_schema();
        raw["type"] = json!("tool");
        assert!(CommandSchema::from_value(raw).is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut raw = read_file_schema();
        raw["function"]["name"] = json!("  ");
        assert!(matches!(
            CommandSchema::from_value(raw),
            Err(RegistryError::EmptyName)
        ));
    }

    #[test]
    fn test_category_from_module_path() {
        assert_eq!(
            category_from_module_path("agent_commands_host::commands::file_ops::read_file"),
            "file_ops"
        );
        assert_eq!(category_from_module_path("stubs::math::add"), "math");
        assert_eq!(category_from_module_path("lonely"), MISC_CATEGORY);
        assert_eq!(category_from_module_path("x::commands"), MISC_CATEGORY);
    }
}
