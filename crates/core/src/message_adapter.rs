//! Host chat turns to vendor-neutral messages.
//!
//! Translation is total: malformed arguments, empty content and unknown part
//! kinds all degrade to a well-formed message instead of an error.

use std::collections::HashMap;

use serde_json::Value;

use crate::ai_sdk_types::{
    AssistantPart, ChatMessage, ContentPart, Role, ToolResultItem, ToolResultPart,
    TranslatedMessage, UserContent, UserPart,
};
use crate::core::logging::Logger;

/// Tool name used for a tool result whose originating call is unknown.
pub const PLACEHOLDER_TOOL_NAME: &str = "test";

const JOIN_SEPARATOR: &str = " ,";

/// Translate a single host turn.
///
/// Tool results carry `PLACEHOLDER_TOOL_NAME`, since a result part does not
/// echo the tool name. Use `translate_conversation` to correlate names.
pub fn translate(message: &ChatMessage, logger: &dyn Logger) -> TranslatedMessage {
    translate_with_names(message, &HashMap::new(), logger)
}

/// Translate a whole history, resolving tool-result names from the
/// tool calls that appear earlier in the same conversation.
pub fn translate_conversation(
    messages: &[ChatMessage],
    logger: &dyn Logger,
) -> Vec<TranslatedMessage> {
    let mut call_names: HashMap<String, String> = HashMap::new();
    let mut out = Vec::with_capacity(messages.len());
    for message in messages {
        out.push(translate_with_names(message, &call_names, logger));
        if message.role == Role::Assistant {
            for part in &message.content {
                if let ContentPart::ToolCall { call_id, name, .. } = part {
                    call_names.insert(call_id.clone(), name.clone());
                }
            }
        }
    }
    out
}

fn translate_with_names(
    message: &ChatMessage,
    call_names: &HashMap<String, String>,
    logger: &dyn Logger,
) -> TranslatedMessage {
    match message.role {
        Role::User => translate_user(message, call_names),
        Role::Assistant => TranslatedMessage::Assistant {
            content: message
                .content
                .iter()
                .map(|part| translate_assistant_part(part, logger))
                .collect(),
        },
        Role::System => TranslatedMessage::System {
            content: message
                .content
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { value } => Some(value.trim()),
                    _ => None,
                })
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(JOIN_SEPARATOR),
        },
    }
}

fn translate_user(message: &ChatMessage, call_names: &HashMap<String, String>) -> TranslatedMessage {
    let mut tool_results = Vec::new();
    let mut texts = Vec::new();
    for part in &message.content {
        match part {
            ContentPart::ToolResult { call_id, content } => tool_results.push(ToolResultPart {
                tool_call_id: call_id.clone(),
                tool_name: call_names
                    .get(call_id)
                    .cloned()
                    .unwrap_or_else(|| PLACEHOLDER_TOOL_NAME.to_string()),
                result: serialize_tool_result(content),
            }),
            ContentPart::Text { value } if !value.is_empty() => {
                texts.push(UserPart::Text {
                    text: value.clone(),
                });
            }
            _ => {}
        }
    }

    if !tool_results.is_empty() {
        return TranslatedMessage::Tool {
            content: tool_results,
        };
    }
    if !texts.is_empty() {
        return TranslatedMessage::User {
            content: UserContent::Parts(texts),
        };
    }
    let raw = serde_json::to_string(&message.content).unwrap_or_else(|_| "[]".to_string());
    TranslatedMessage::User {
        content: UserContent::Raw(raw),
    }
}

fn translate_assistant_part(part: &ContentPart, logger: &dyn Logger) -> AssistantPart {
    match part {
        ContentPart::Text { value } => AssistantPart::Text {
            text: value.clone(),
        },
        ContentPart::ToolCall {
            call_id,
            name,
            input,
        } => AssistantPart::ToolCall {
            tool_call_id: call_id.clone(),
            tool_name: name.clone(),
            args: parse_call_input(input, logger),
        },
        ContentPart::ToolResult { .. } | ContentPart::Unknown => AssistantPart::Text {
            text: String::new(),
        },
    }
}

/// String inputs are parsed as JSON; on failure the raw string is kept.
fn parse_call_input(input: &Value, logger: &dyn Logger) -> Value {
    match input {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                logger.error(&format!("Skipping tool call argument parsing: {err}"));
                input.clone()
            }
        },
        other => other.clone(),
    }
}

/// Text items verbatim, other items as JSON, joined with `" ,"`.
pub fn serialize_tool_result(items: &[ToolResultItem]) -> String {
    items
        .iter()
        .map(|item| match item {
            ToolResultItem::Text { value } => value.clone(),
            ToolResultItem::Other(value) => value.to_string(),
        })
        .collect::<Vec<_>>()
        .join(JOIN_SEPARATOR)
}
