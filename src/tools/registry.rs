//! Static tool registry and argument validation.
//!
//! Input schemas are generated from the typed input structs, so the contract
//! published through `tools/list` is the same one the dispatcher enforces.

use crate::error::ToolError;
use crate::tools::fix_block::FixBlockInput;
use crate::tools::match_block::MatchHtmlInput;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// JSON object used for tool arguments and schemas.
pub type JsonObject = Map<String, Value>;

/// Which implementation a registered tool routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    MatchHtmlToBlock,
    FixBlockBasedOnSuggestion,
}

impl ToolKind {
    /// Protocol name of the tool.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MatchHtmlToBlock => "match_html_to_block",
            Self::FixBlockBasedOnSuggestion => "fix_block_based_on_suggestion",
        }
    }
}

/// A tool as advertised to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Arc<JsonObject>,
    #[serde(skip)]
    pub kind: ToolKind,
}

impl ToolDefinition {
    fn new<T: JsonSchema>(kind: ToolKind, description: &'static str) -> Self {
        Self {
            name: kind.name(),
            description,
            input_schema: Arc::new(schema_object::<T>()),
            kind,
        }
    }

    /// Names listed under the schema's `required` key.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Checks `arguments` against the declared schema.
    ///
    /// Required fields must be present, non-null and, for strings, not blank.
    /// Every provided field that the schema declares must match one of its
    /// declared JSON types. Undeclared fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidArguments` describing the first violation.
    pub fn validate(&self, arguments: &JsonObject) -> Result<(), ToolError> {
        let properties = self
            .input_schema
            .get("properties")
            .and_then(Value::as_object);

        for field in self.required() {
            match arguments.get(field) {
                None | Some(Value::Null) => {
                    return Err(ToolError::invalid(
                        self.name,
                        format!("missing required field '{field}'"),
                    ));
                }
                Some(Value::String(s)) if s.trim().is_empty() => {
                    return Err(ToolError::invalid(
                        self.name,
                        format!("field '{field}' must not be empty"),
                    ));
                }
                Some(_) => {}
            }
        }

        let Some(properties) = properties else {
            return Ok(());
        };

        for (field, value) in arguments {
            let Some(property) = properties.get(field) else {
                continue;
            };
            check_type(self.name, field, property, value)?;
        }

        Ok(())
    }
}

/// The fixed set of tools this server exposes.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Builds the registry with the built-in tools.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: vec![
                ToolDefinition::new::<MatchHtmlInput>(
                    ToolKind::MatchHtmlToBlock,
                    "Find the block that generates the html code that is provided",
                ),
                ToolDefinition::new::<FixBlockInput>(
                    ToolKind::FixBlockBasedOnSuggestion,
                    "Generate fixes in a block based on suggestion",
                ),
            ],
        }
    }

    /// All registered tools, in declaration order.
    #[must_use]
    pub fn list_tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Looks up a tool by protocol name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn schema_object<T: JsonSchema>() -> JsonObject {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(&schema) {
        Ok(Value::Object(mut map)) => {
            // Clients only need the object shape
            map.remove("$schema");
            map
        }
        _ => JsonObject::new(),
    }
}

fn declared_types(property: &Value) -> Vec<&str> {
    match property.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn matches_type(value: &Value, ty: &str) -> bool {
    match ty {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_type(tool: &str, field: &str, property: &Value, value: &Value) -> Result<(), ToolError> {
    let types = declared_types(property);
    if !types.is_empty() && !types.iter().any(|t| matches_type(value, t)) {
        return Err(ToolError::invalid(
            tool,
            format!(
                "field '{field}' must be {}, got {}",
                types.join(" or "),
                json_type_name(value)
            ),
        ));
    }

    if let (Value::Array(items), Some(item_schema)) = (value, property.get("items")) {
        let item_types = declared_types(item_schema);
        if let Some(bad) = items
            .iter()
            .find(|item| !item_types.is_empty() && !item_types.iter().any(|t| matches_type(item, t)))
        {
            return Err(ToolError::invalid(
                tool,
                format!(
                    "items of '{field}' must be {}, got {}",
                    item_types.join(" or "),
                    json_type_name(bad)
                ),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_registry_lists_both_tools() {
        let registry = ToolRegistry::new();
        let names: Vec<_> = registry.list_tools().iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["match_html_to_block", "fix_block_based_on_suggestion"]);
    }

    #[test]
    fn test_schemas_use_protocol_field_names() {
        let registry = ToolRegistry::new();

        let fix = registry.get("fix_block_based_on_suggestion").unwrap();
        let mut required: Vec<_> = fix.required().collect();
        required.sort_unstable();
        assert_eq!(required, vec!["blockName", "suggestion"]);

        let props = fix.input_schema["properties"].as_object().unwrap();
        for key in ["blockName", "suggestion", "systemPrompt", "temperature", "maxTokens", "fileExtensions"] {
            assert!(props.contains_key(key), "missing property {key}");
        }
        assert_eq!(fix.input_schema["type"], "object");
        assert!(!fix.input_schema.contains_key("$schema"));

        let matcher = registry.get("match_html_to_block").unwrap();
        assert_eq!(matcher.required().collect::<Vec<_>>(), vec!["message"]);
    }

    #[test]
    fn test_schema_properties_have_descriptions() {
        let registry = ToolRegistry::new();
        for tool in registry.list_tools() {
            let props = tool.input_schema["properties"].as_object().unwrap();
            for (name, prop) in props {
                assert!(
                    prop.get("description").is_some_and(Value::is_string),
                    "{}.{} has no description",
                    tool.name,
                    name
                );
            }
        }
    }

    #[test]
    fn test_unknown_name_lookup() {
        assert!(ToolRegistry::new().get("delete_everything").is_none());
    }

    #[test]
    fn test_validate_missing_required() {
        let registry = ToolRegistry::new();
        let fix = registry.get("fix_block_based_on_suggestion").unwrap();

        let err = fix.validate(&args(json!({"blockName": "hero"}))).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENTS");
        assert!(err.to_string().contains("'suggestion'"));

        let err = fix
            .validate(&args(json!({"blockName": null, "suggestion": "x"})))
            .unwrap_err();
        assert!(err.to_string().contains("'blockName'"));
    }

    #[test]
    fn test_validate_blank_required_string() {
        let registry = ToolRegistry::new();
        let matcher = registry.get("match_html_to_block").unwrap();

        let err = matcher.validate(&args(json!({"message": "   "}))).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_validate_wrong_types() {
        let registry = ToolRegistry::new();
        let matcher = registry.get("match_html_to_block").unwrap();

        let err = matcher
            .validate(&args(json!({"message": "<div>", "temperature": "hot"})))
            .unwrap_err();
        assert!(err.to_string().contains("'temperature'"));

        let err = matcher
            .validate(&args(json!({"message": "<div>", "maxTokens": 1.5})))
            .unwrap_err();
        assert!(err.to_string().contains("'maxTokens'"));

        let fix = registry.get("fix_block_based_on_suggestion").unwrap();
        let err = fix
            .validate(&args(json!({
                "blockName": "hero",
                "suggestion": "add alt text",
                "fileExtensions": [".js", 3]
            })))
            .unwrap_err();
        assert!(err.to_string().contains("items of 'fileExtensions'"));
    }

    #[test]
    fn test_validate_accepts_valid_arguments() {
        let registry = ToolRegistry::new();
        let fix = registry.get("fix_block_based_on_suggestion").unwrap();

        fix.validate(&args(json!({
            "blockName": "hero",
            "suggestion": "add alt text",
            "systemPrompt": null,
            "temperature": 0.5,
            "maxTokens": 2000,
            "fileExtensions": [".js"],
            "extra": {"ignored": true}
        })))
        .unwrap();
    }
}
