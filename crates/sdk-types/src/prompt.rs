//! Vendor-neutral request model.
//!
//! `TranslatedMessage` is what the message adapter produces from a host turn
//! and what each wire dialect renders into its own JSON body. `ToolSet` is the
//! normalized tool map keyed by the (possibly renamed) tool name.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UserPart {
    Text { text: String },
}

/// User content is either a list of text parts or, as a last resort, the raw
/// host content serialized to a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UserContent {
    Parts(Vec<UserPart>),
    Raw(String),
}

impl UserContent {
    /// Flatten to plain text for dialects that only accept a string.
    pub fn joined_text(&self) -> String {
        match self {
            UserContent::Raw(raw) => raw.clone(),
            UserContent::Parts(parts) => parts
                .iter()
                .map(|p| match p {
                    UserPart::Text { text } => text.as_str(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AssistantPart {
    Text {
        text: String,
    },
    /// `args` holds the parsed arguments, or the raw string when it was not
    /// valid JSON.
    #[serde(rename_all = "camelCase")]
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        args: Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultPart {
    pub tool_call_id: String,
    pub tool_name: String,
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum TranslatedMessage {
    System { content: String },
    User { content: UserContent },
    Assistant { content: Vec<AssistantPart> },
    Tool { content: Vec<ToolResultPart> },
}

impl TranslatedMessage {
    pub fn role(&self) -> &'static str {
        match self {
            TranslatedMessage::System { .. } => "system",
            TranslatedMessage::User { .. } => "user",
            TranslatedMessage::Assistant { .. } => "assistant",
            TranslatedMessage::Tool { .. } => "tool",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    pub parameters: Value,
    pub description: String,
}

/// Ordered tool map. Iteration follows insertion order; inserting a name that
/// is already present replaces the spec in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSet {
    entries: Vec<(String, ToolSpec)>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, spec: ToolSpec) -> Option<ToolSpec> {
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            return Some(std::mem::replace(&mut slot.1, spec));
        }
        self.entries.push((name, spec));
        None
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolSpec)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }
}

impl Serialize for ToolSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, spec) in &self.entries {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    Auto,
    Required,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::Required => "required",
        }
    }
}
