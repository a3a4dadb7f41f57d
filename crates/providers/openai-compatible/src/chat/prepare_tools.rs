use serde_json::{json, Value as JsonValue};

use crate::ai_sdk_types::{ToolChoice, ToolSet};

pub struct PreparedTools {
    pub tools: Option<Vec<JsonValue>>,
    pub tool_choice: Option<JsonValue>,
}

pub fn prepare_tools(tools: &Option<ToolSet>, tool_choice: &Option<ToolChoice>) -> PreparedTools {
    let openai_tools = tools.as_ref().filter(|t| !t.is_empty()).map(|tools| {
        tools
            .iter()
            .map(|(name, spec)| {
                json!({
                    "type": "function",
                    "function": {
                        "name": name,
                        "description": spec.description,
                        "parameters": spec.parameters,
                    }
                })
            })
            .collect::<Vec<_>>()
    });

    // A choice without tools is rejected by every compatible endpoint.
    let tool_choice_val = match (&openai_tools, tool_choice) {
        (Some(_), Some(choice)) => Some(json!(choice.as_str())),
        _ => None,
    };

    PreparedTools {
        tools: openai_tools,
        tool_choice: tool_choice_val,
    }
}
