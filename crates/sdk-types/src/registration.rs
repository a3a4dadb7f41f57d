//! Registration metadata exposed to the host for each vendor instance.

use serde::{Deserialize, Serialize};

pub const BOOST_VENDOR: &str = "boost";
pub const BOOST_FAMILY: &str = "boost";
pub const BOOST_VERSION: &str = "1.0.0";
pub const DEFAULT_MAX_INPUT_TOKENS: u32 = 200_000;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8_192;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelCapabilities {
    pub agent_mode: bool,
    pub tool_calling: bool,
    pub vision: bool,
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            agent_mode: true,
            tool_calling: true,
            vision: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelRegistration {
    /// Provider id the host registers under (e.g. "anthropic").
    pub id: String,
    pub vendor: String,
    pub name: String,
    pub family: String,
    pub version: String,
    pub max_input_tokens: u32,
    pub max_output_tokens: u32,
    pub is_default: bool,
    pub is_user_selectable: bool,
    pub capabilities: ModelCapabilities,
}

impl ModelRegistration {
    /// Registration record with the boost defaults.
    pub fn boost(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vendor: BOOST_VENDOR.to_string(),
            name: name.into(),
            family: BOOST_FAMILY.to_string(),
            version: BOOST_VERSION.to_string(),
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            is_default: true,
            is_user_selectable: true,
            capabilities: ModelCapabilities::default(),
        }
    }
}
