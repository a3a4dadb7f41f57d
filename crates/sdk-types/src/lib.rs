//! Shared type definitions for the boost bridge.
//!
//! Three families of types live here:
//! - the editor host's chat model (`ChatMessage`, `ContentPart`, `ToolDeclaration`,
//!   `ResponseFragment`), which the core only reads;
//! - the vendor-neutral request and event model (`prompt`, `events`) that every
//!   wire dialect consumes and produces;
//! - registration metadata exposed back to the host (`registration`).

pub mod events;
pub mod json;
pub mod prompt;
pub mod registration;

pub use events::{FinishReason, StreamEvent, TokenUsage};
pub use prompt::{
    AssistantPart, ToolChoice, ToolResultPart, ToolSet, ToolSpec, TranslatedMessage, UserContent,
    UserPart,
};
pub use registration::{ModelCapabilities, ModelRegistration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a host chat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One item inside a tool result. Text items are carried verbatim, anything
/// else is opaque to the core and gets JSON-stringified on translation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ToolResultItem {
    Text { value: String },
    Other(Value),
}

impl ToolResultItem {
    pub fn text(value: impl Into<String>) -> Self {
        ToolResultItem::Text {
            value: value.into(),
        }
    }
}

/// Content parts that can appear in a host chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        value: String,
    },
    /// Assistant requested a tool call. `input` is either an object or a
    /// JSON-encoded string that still has to be parsed.
    ToolCall {
        call_id: String,
        name: String,
        input: Value,
    },
    /// Output of a tool, correlated to a prior call by `call_id`.
    ToolResult {
        call_id: String,
        content: Vec<ToolResultItem>,
    },
    /// Part kinds introduced by newer hosts.
    #[serde(other)]
    Unknown,
}

impl ContentPart {
    pub fn text(value: impl Into<String>) -> Self {
        ContentPart::Text {
            value: value.into(),
        }
    }

    pub fn tool_call(call_id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ContentPart::ToolCall {
            call_id: call_id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: Vec<ToolResultItem>) -> Self {
        ContentPart::ToolResult {
            call_id: call_id.into(),
            content,
        }
    }
}

/// A single turn of the conversation as supplied by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    pub fn new(role: Role, content: Vec<ContentPart>) -> Self {
        Self { role, content }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentPart::text(text)])
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentPart::text(text)])
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![ContentPart::text(text)])
    }
}

/// A callable the model may invoke.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolDeclaration {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl ToolDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// Host tool-mode setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    Auto,
    Required,
}

/// Per-request options supplied by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    #[serde(default)]
    pub tools: Vec<ToolDeclaration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_mode: Option<ToolMode>,
}

/// One incremental unit of output delivered to the host's progress sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseFragment {
    Text {
        value: String,
    },
    ToolCall {
        call_id: String,
        name: String,
        input: Value,
    },
}

impl ResponseFragment {
    pub fn text(value: impl Into<String>) -> Self {
        ResponseFragment::Text {
            value: value.into(),
        }
    }

    pub fn tool_call(call_id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ResponseFragment::ToolCall {
            call_id: call_id.into(),
            name: name.into(),
            input,
        }
    }
}

#[cfg(test)]
#[path = "../tests/json_tests.rs"]
mod json_tests;

#[cfg(test)]
#[path = "../tests/host_model_tests.rs"]
mod host_model_tests;
