use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::ai_sdk_types::json::parse_json_loose;
use crate::ai_sdk_types::{AssistantPart, TranslatedMessage, UserContent, UserPart};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleSystemInstruction {
    pub parts: Vec<GoogleTextPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleTextPart {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum GoogleContent {
    #[serde(rename = "user")]
    User { parts: Vec<GoogleContentPart> },
    #[serde(rename = "model")]
    Model { parts: Vec<GoogleContentPart> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GoogleContentPart {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: GoogleFunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: GoogleFunctionResponse,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleFunctionCall {
    pub name: String,
    pub args: JsonValue,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleFunctionResponse {
    pub name: String,
    pub response: JsonValue,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GooglePrompt {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "systemInstruction")]
    pub system_instruction: Option<GoogleSystemInstruction>,
    pub contents: Vec<GoogleContent>,
}

/// Convert translated messages into the Gemini prompt shape.
///
/// System turns are collected into `systemInstruction` wherever they appear.
/// Gemma models have no system slot, so their system text is prefixed to the
/// first user turn instead. Turns with no parts are dropped.
pub fn convert_to_google_prompt(prompt: &[TranslatedMessage], is_gemma: bool) -> GooglePrompt {
    let mut system_instruction_parts: Vec<GoogleTextPart> = Vec::new();
    let mut contents: Vec<GoogleContent> = Vec::new();
    let mut tool_call_names: HashMap<&str, &str> = HashMap::new();

    for msg in prompt {
        match msg {
            TranslatedMessage::System { content } => {
                if !content.is_empty() {
                    system_instruction_parts.push(GoogleTextPart {
                        text: content.clone(),
                    });
                }
            }
            TranslatedMessage::User { content } => {
                let parts: Vec<GoogleContentPart> = match content {
                    UserContent::Raw(raw) => vec![GoogleContentPart::Text { text: raw.clone() }],
                    UserContent::Parts(parts) => parts
                        .iter()
                        .map(|part| match part {
                            UserPart::Text { text } => GoogleContentPart::Text { text: text.clone() },
                        })
                        .collect(),
                };
                if !parts.is_empty() {
                    contents.push(GoogleContent::User { parts });
                }
            }
            TranslatedMessage::Assistant { content } => {
                let mut parts: Vec<GoogleContentPart> = Vec::new();
                for part in content {
                    match part {
                        AssistantPart::Text { text } => {
                            if !text.is_empty() {
                                parts.push(GoogleContentPart::Text { text: text.clone() });
                            }
                        }
                        AssistantPart::ToolCall {
                            tool_call_id,
                            tool_name,
                            args,
                        } => {
                            tool_call_names.insert(tool_call_id.as_str(), tool_name.as_str());
                            parts.push(GoogleContentPart::FunctionCall {
                                function_call: GoogleFunctionCall {
                                    name: tool_name.clone(),
                                    args: function_call_args(args),
                                },
                            });
                        }
                    }
                }
                if !parts.is_empty() {
                    contents.push(GoogleContent::Model { parts });
                }
            }
            TranslatedMessage::Tool { content } => {
                let parts: Vec<GoogleContentPart> = content
                    .iter()
                    .map(|part| {
                        let resolved_tool_name = if part.tool_name.trim().is_empty() {
                            tool_call_names
                                .get(part.tool_call_id.as_str())
                                .map(|name| name.to_string())
                                .unwrap_or_else(|| part.tool_call_id.clone())
                        } else {
                            part.tool_name.clone()
                        };
                        GoogleContentPart::FunctionResponse {
                            function_response: GoogleFunctionResponse {
                                name: resolved_tool_name.clone(),
                                response: json!({
                                    "name": resolved_tool_name,
                                    "content": part.result,
                                }),
                            },
                        }
                    })
                    .collect();
                if !parts.is_empty() {
                    contents.push(GoogleContent::User { parts });
                }
            }
        }
    }

    // Gemma: push system text into first user as prefix
    if is_gemma && !system_instruction_parts.is_empty() {
        if let Some(GoogleContent::User { parts }) = contents.get_mut(0) {
            let sys_text = system_instruction_parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            parts.insert(
                0,
                GoogleContentPart::Text {
                    text: format!("{}\n\n", sys_text),
                },
            );
        }
    }

    let system_instruction = if !system_instruction_parts.is_empty() && !is_gemma {
        Some(GoogleSystemInstruction {
            parts: system_instruction_parts,
        })
    } else {
        None
    };

    GooglePrompt {
        system_instruction,
        contents,
    }
}

/// `functionCall.args` must be an object.
fn function_call_args(args: &JsonValue) -> JsonValue {
    match args {
        JsonValue::Object(_) => args.clone(),
        JsonValue::String(raw) => match parse_json_loose(raw) {
            Some(v @ JsonValue::Object(_)) => v,
            _ => json!({}),
        },
        _ => json!({}),
    }
}
