use serde_json::{json, Value as JsonValue};

use crate::ai_sdk_core::upstream::UpstreamRequest;
use crate::ai_sdk_types::json::parse_json_loose;
use crate::ai_sdk_types::{AssistantPart, ToolChoice, TranslatedMessage, UserContent, UserPart};
use crate::provider_anthropic::api_types::{
    AnthropicContent, AnthropicMessage, AnthropicMessagesRequest, AnthropicRole, AnthropicTool,
    AnthropicToolChoice,
};

pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Render a translated request as a Messages API body.
///
/// System turns are hoisted into `system`, tool results travel in a user
/// turn, and consecutive turns of the same role are merged since the API
/// requires alternation.
pub fn build_messages_request(req: &UpstreamRequest) -> AnthropicMessagesRequest {
    let mut system: Vec<&str> = Vec::new();
    let mut messages: Vec<AnthropicMessage> = Vec::new();

    for message in &req.messages {
        let (role, content) = match message {
            TranslatedMessage::System { content } => {
                if !content.is_empty() {
                    system.push(content);
                }
                continue;
            }
            TranslatedMessage::User { content } => (AnthropicRole::User, user_blocks(content)),
            TranslatedMessage::Assistant { content } => (
                AnthropicRole::Assistant,
                content.iter().filter_map(assistant_block).collect(),
            ),
            TranslatedMessage::Tool { content } => (
                AnthropicRole::User,
                content
                    .iter()
                    .map(|part| AnthropicContent::ToolResult {
                        tool_use_id: part.tool_call_id.clone(),
                        content: part.result.clone(),
                    })
                    .collect(),
            ),
        };
        if content.is_empty() {
            continue;
        }
        match messages.last_mut() {
            Some(last) if last.role == role => last.content.extend(content),
            _ => messages.push(AnthropicMessage { role, content }),
        }
    }

    let tools = req.tools.as_ref().map(|tools| {
        tools
            .iter()
            .map(|(name, spec)| AnthropicTool {
                name: name.to_string(),
                description: spec.description.clone(),
                input_schema: spec.parameters.clone(),
            })
            .collect()
    });
    let tool_choice = req.tool_choice.map(|choice| match choice {
        ToolChoice::Auto => AnthropicToolChoice::Auto,
        ToolChoice::Required => AnthropicToolChoice::Any,
    });

    AnthropicMessagesRequest {
        model: req.model.clone(),
        max_tokens: DEFAULT_MAX_TOKENS,
        system: (!system.is_empty()).then(|| system.join("\n")),
        messages,
        tools,
        tool_choice,
        stream: true,
    }
}

fn user_blocks(content: &UserContent) -> Vec<AnthropicContent> {
    match content {
        UserContent::Raw(raw) => vec![AnthropicContent::Text { text: raw.clone() }],
        UserContent::Parts(parts) => parts
            .iter()
            .map(|part| match part {
                UserPart::Text { text } => AnthropicContent::Text { text: text.clone() },
            })
            .collect(),
    }
}

// Empty text blocks are rejected by the API.
fn assistant_block(part: &AssistantPart) -> Option<AnthropicContent> {
    match part {
        AssistantPart::Text { text } if text.is_empty() => None,
        AssistantPart::Text { text } => Some(AnthropicContent::Text { text: text.clone() }),
        AssistantPart::ToolCall {
            tool_call_id,
            tool_name,
            args,
        } => Some(AnthropicContent::ToolUse {
            id: tool_call_id.clone(),
            name: tool_name.clone(),
            input: tool_input_object(args),
        }),
    }
}

/// `tool_use.input` must be an object; unparsed argument strings are
/// recovered when they contain one.
fn tool_input_object(args: &JsonValue) -> JsonValue {
    match args {
        JsonValue::Object(_) => args.clone(),
        JsonValue::String(raw) => match parse_json_loose(raw) {
            Some(v @ JsonValue::Object(_)) => v,
            _ => json!({}),
        },
        _ => json!({}),
    }
}
