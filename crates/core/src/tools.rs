use serde_json::{json, Value};
use thiserror::Error;

use crate::ai_sdk_types::{ToolDeclaration, ToolSet, ToolSpec};
use crate::core::logging::Logger;

pub type ToolNameTransform = fn(&str) -> String;

const GEMINI_TOOL_NAME_MAX: usize = 64;

#[derive(Debug, Error)]
#[error("cannot convert schema for tool '{tool}': {reason}")]
pub struct ToolSchemaConversionError {
    pub tool: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTools {
    pub tools: ToolSet,
    pub has_tools: bool,
}

pub fn default_tool_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// Wrap a declaration's schema into the request representation.
///
/// Vendors accept only object schemas whose `type`, when present, is a
/// string or a list of strings.
pub fn convert_schema(tool: &str, schema: &Value) -> Result<Value, ToolSchemaConversionError> {
    let err = |reason: &str| ToolSchemaConversionError {
        tool: tool.to_string(),
        reason: reason.to_string(),
    };
    let obj = schema
        .as_object()
        .ok_or_else(|| err("schema is not a JSON object"))?;
    match obj.get("type") {
        None | Some(Value::String(_)) => {}
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
        Some(_) => return Err(err("'type' must be a string or an array of strings")),
    }
    Ok(schema.clone())
}

/// Normalize host tool declarations into the vendor tool map.
///
/// A missing schema is replaced by `default_tool_schema` with a warning; a
/// schema that fails conversion drops only that tool.
pub fn normalize_tools(
    declarations: &[ToolDeclaration],
    transform: Option<ToolNameTransform>,
    vendor: &str,
    logger: &dyn Logger,
) -> NormalizedTools {
    let mut tools = ToolSet::new();
    for decl in declarations {
        let name = match transform {
            Some(f) => f(&decl.name),
            None => decl.name.clone(),
        };
        let schema = match decl.input_schema.as_ref().filter(|s| !s.is_null()) {
            Some(schema) => schema.clone(),
            None => {
                logger.warn(&format!(
                    "[{vendor}] Tool '{}' has no input schema, providing default empty object schema",
                    decl.name
                ));
                default_tool_schema()
            }
        };
        match convert_schema(&decl.name, &schema) {
            Ok(parameters) => {
                tools.insert(
                    name.clone(),
                    ToolSpec {
                        parameters,
                        description: decl.description.clone(),
                    },
                );
                if name != decl.name {
                    logger.info(&format!(
                        "[{vendor}] Tool name converted: \"{}\" -> \"{}\"",
                        decl.name, name
                    ));
                }
            }
            Err(err) => {
                logger.error(&format!(
                    "[{vendor}] Failed to convert schema for tool '{}': {err}",
                    decl.name
                ));
                logger.error(&format!("[{vendor}] Tool inputSchema: {schema}"));
            }
        }
    }
    let has_tools = !tools.is_empty();
    NormalizedTools { tools, has_tools }
}

/// Gemini function-name rules: `[A-Za-z0-9_.-]` only, starting with a letter
/// or underscore, at most 64 characters. Idempotent on valid names.
///
/// Other characters become one `_` per UTF-16 code unit, so names agree with
/// those produced by JavaScript-based clients (`"🙂"` maps to `"__"`).
pub fn gemini_tool_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
            out.push(c);
        } else {
            out.extend(std::iter::repeat('_').take(c.len_utf16()));
        }
    }
    let starts_ok = out
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !starts_ok {
        out.insert(0, '_');
    }
    out.truncate(GEMINI_TOOL_NAME_MAX);
    out
}
