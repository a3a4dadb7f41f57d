use serde_json::{json, Map, Value as JsonValue};

use crate::ai_sdk_types::{AssistantPart, TranslatedMessage, UserContent, UserPart};

/// Render translated messages as Chat Completions `messages`.
///
/// A single user text part is sent as a plain string. Each tool result is its
/// own `role: tool` message.
pub fn convert_to_openai_compatible_chat_messages(
    prompt: &[TranslatedMessage],
) -> Vec<JsonValue> {
    let mut messages: Vec<JsonValue> = Vec::new();
    for m in prompt {
        match m {
            TranslatedMessage::System { content } => {
                messages.push(json!({"role":"system","content": content}));
            }
            TranslatedMessage::User { content } => {
                let content = match content {
                    UserContent::Raw(raw) => JsonValue::String(raw.clone()),
                    UserContent::Parts(parts) if parts.len() == 1 => {
                        JsonValue::String(content.joined_text())
                    }
                    UserContent::Parts(parts) => JsonValue::Array(
                        parts
                            .iter()
                            .map(|part| match part {
                                UserPart::Text { text } => json!({"type":"text","text": text}),
                            })
                            .collect(),
                    ),
                };
                messages.push(json!({"role":"user","content": content}));
            }
            TranslatedMessage::Assistant { content } => {
                let mut text = String::new();
                let mut tool_calls: Vec<JsonValue> = Vec::new();
                for part in content {
                    match part {
                        AssistantPart::Text { text: t } => text.push_str(t),
                        AssistantPart::ToolCall {
                            tool_call_id,
                            tool_name,
                            args,
                        } => {
                            tool_calls.push(json!({
                                "type":"function",
                                "id": tool_call_id,
                                "function": {"name": tool_name, "arguments": arguments_string(args)}
                            }));
                        }
                    }
                }
                let mut obj = Map::new();
                obj.insert("role".into(), json!("assistant"));
                if !text.is_empty() || tool_calls.is_empty() {
                    obj.insert("content".into(), JsonValue::String(text));
                }
                if !tool_calls.is_empty() {
                    obj.insert("tool_calls".into(), JsonValue::Array(tool_calls));
                }
                messages.push(JsonValue::Object(obj));
            }
            TranslatedMessage::Tool { content } => {
                for tr in content {
                    messages.push(json!({
                        "role":"tool",
                        "tool_call_id": tr.tool_call_id,
                        "content": tr.result,
                    }));
                }
            }
        }
    }
    messages
}

/// `function.arguments` is a JSON-encoded string on the wire.
fn arguments_string(args: &JsonValue) -> String {
    match args {
        JsonValue::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}
