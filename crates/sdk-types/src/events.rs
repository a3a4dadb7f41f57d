use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Error,
    Other,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Vendor-neutral classification of upstream stream events.
///
/// Every wire dialect maps its raw frames onto this set; the stream adapter
/// only ever sees these variants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    TextDelta {
        delta: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolCallStreamingStart {
        tool_call_id: String,
        tool_name: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolCallDelta {
        tool_call_id: String,
        tool_name: String,
        args_text_delta: String,
    },
    /// A complete tool call. Id and name are optional so that partial calls a
    /// vendor leaks into the stream stay representable and can be dropped.
    #[serde(rename_all = "camelCase")]
    ToolCall {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_name: Option<String>,
        args: Value,
    },
    #[serde(rename_all = "camelCase")]
    StepFinish {
        finish_reason: FinishReason,
    },
    #[serde(rename_all = "camelCase")]
    Finish {
        finish_reason: FinishReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
    },
    /// In-band vendor error. Terminal for the request.
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cause: Option<Value>,
    },
}

impl StreamEvent {
    pub fn text(delta: impl Into<String>) -> Self {
        StreamEvent::TextDelta {
            delta: delta.into(),
        }
    }

    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        StreamEvent::ToolCall {
            tool_call_id: Some(id.into()),
            tool_name: Some(name.into()),
            args,
        }
    }

    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::TextDelta { .. } => "text-delta",
            StreamEvent::ToolCallStreamingStart { .. } => "tool-call-streaming-start",
            StreamEvent::ToolCallDelta { .. } => "tool-call-delta",
            StreamEvent::ToolCall { .. } => "tool-call",
            StreamEvent::StepFinish { .. } => "step-finish",
            StreamEvent::Finish { .. } => "finish",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// JSON rendering for diagnostics.
    pub fn to_log_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"type\":\"{}\"}}", self.kind()))
    }
}
