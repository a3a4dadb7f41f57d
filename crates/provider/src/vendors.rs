//! The five integrated vendors as static data.
//!
//! Each `VendorRegistration` pairs a vendor id with the wire dialect it
//! speaks and a constructor for its `VendorConfig`. Activation walks
//! `registrations()` in order; nothing here performs I/O.

use std::sync::Arc;

use crate::ai_sdk_core::stream_adapter::VendorConfig;
use crate::ai_sdk_core::tools::gemini_tool_name;
use crate::ai_sdk_core::transport::TransportConfig;
use crate::ai_sdk_core::upstream::UpstreamClient;
use crate::ai_sdk_core::SdkError;
use crate::ai_sdk_providers_anthropic::provider::{
    CLAUDE_CLI_USER_AGENT, CLAUDE_CODE_BETAS, DEFAULT_BASE_URL as ANTHROPIC_BASE_URL,
};
use crate::ai_sdk_providers_anthropic::AnthropicMessagesClient;
use crate::ai_sdk_providers_google::provider::DEFAULT_BASE_URL as GEMINI_BASE_URL;
use crate::ai_sdk_providers_google::GoogleGenAiClient;
use crate::ai_sdk_providers_openai_compatible::OpenAICompatibleChatClient;

pub const ANTHROPIC_SECRET_KEY: &str = "AnthropicCopilotBoostApiKey";
pub const GROQ_SECRET_KEY: &str = "GroqCopilotBoostApiKey";
pub const GEMINI_SECRET_KEY: &str = "GeminiCopilotBoostApiKey";
pub const OPENROUTER_SECRET_KEY: &str = "OpenRouterCopilotBoostApiKey";
pub const OPENAI_SECRET_KEY: &str = "OpenAICopilotBoostApiKey";

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub const MISSING_KEY_MESSAGE: &str = "No API key set. Please set your API key in the settings.";
pub const OPENROUTER_MISSING_KEY_MESSAGE: &str =
    "No API key set. Please set your OpenRouter API key in the settings.";

/// Wire format a vendor speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    AnthropicMessages,
    ChatCompletions,
    GeminiGenerateContent,
}

impl Dialect {
    /// Streaming client over the default reqwest transport.
    pub fn build_client(
        self,
        transport_cfg: &TransportConfig,
    ) -> Result<Arc<dyn UpstreamClient>, SdkError> {
        let cfg = transport_cfg.clone();
        let client: Arc<dyn UpstreamClient> = match self {
            Dialect::AnthropicMessages => Arc::new(AnthropicMessagesClient::new(cfg)?),
            Dialect::ChatCompletions => Arc::new(OpenAICompatibleChatClient::new(cfg)?),
            Dialect::GeminiGenerateContent => Arc::new(GoogleGenAiClient::new(cfg)?),
        };
        Ok(client)
    }
}

/// Static registration record for one vendor.
pub struct VendorRegistration {
    /// Provider id the host registers under; also the settings/command segment.
    pub id: &'static str,
    pub dialect: Dialect,
    pub config: fn() -> VendorConfig,
}

impl std::fmt::Debug for VendorRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorRegistration")
            .field("id", &self.id)
            .field("dialect", &self.dialect)
            .finish()
    }
}

static REGISTRATIONS: [VendorRegistration; 5] = [
    VendorRegistration {
        id: "anthropic",
        dialect: Dialect::AnthropicMessages,
        config: anthropic,
    },
    VendorRegistration {
        id: "groq",
        dialect: Dialect::ChatCompletions,
        config: groq,
    },
    VendorRegistration {
        id: "gemini",
        dialect: Dialect::GeminiGenerateContent,
        config: gemini,
    },
    VendorRegistration {
        id: "openrouter",
        dialect: Dialect::ChatCompletions,
        config: openrouter,
    },
    VendorRegistration {
        id: "openai",
        dialect: Dialect::ChatCompletions,
        config: openai,
    },
];

/// All vendors in activation order.
pub fn registrations() -> &'static [VendorRegistration] {
    &REGISTRATIONS
}

/// Case-insensitive lookup by vendor id.
pub fn find(id: &str) -> Option<&'static VendorRegistration> {
    let needle = id.trim();
    REGISTRATIONS
        .iter()
        .find(|reg| reg.id.eq_ignore_ascii_case(needle))
}

/// Secrets removed on deactivation. OpenRouter's key survives.
pub const DEACTIVATE_SECRET_KEYS: [&str; 4] = [
    ANTHROPIC_SECRET_KEY,
    GROQ_SECRET_KEY,
    GEMINI_SECRET_KEY,
    OPENAI_SECRET_KEY,
];

pub fn anthropic() -> VendorConfig {
    VendorConfig {
        id: "anthropic",
        display_name: "Anthropic",
        secret_key: ANTHROPIC_SECRET_KEY,
        default_model: "claude-sonnet-4-20250514",
        base_url: ANTHROPIC_BASE_URL,
        base_url_configurable: false,
        headers: vec![
            ("user-agent", CLAUDE_CLI_USER_AGENT),
            ("anthropic-beta", CLAUDE_CODE_BETAS),
        ],
        tool_name_transform: None,
        tool_call_streaming: false,
        missing_key_message: MISSING_KEY_MESSAGE,
    }
}

pub fn groq() -> VendorConfig {
    VendorConfig {
        id: "groq",
        display_name: "Groq",
        secret_key: GROQ_SECRET_KEY,
        default_model: "deepseek-r1-distill-llama-70b",
        base_url: GROQ_BASE_URL,
        base_url_configurable: false,
        headers: Vec::new(),
        tool_name_transform: None,
        tool_call_streaming: true,
        missing_key_message: MISSING_KEY_MESSAGE,
    }
}

pub fn gemini() -> VendorConfig {
    VendorConfig {
        id: "gemini",
        display_name: "Gemini",
        secret_key: GEMINI_SECRET_KEY,
        default_model: "gemini-2.5-pro-exp-03-25",
        base_url: GEMINI_BASE_URL,
        base_url_configurable: false,
        headers: Vec::new(),
        tool_name_transform: Some(gemini_tool_name),
        tool_call_streaming: true,
        missing_key_message: MISSING_KEY_MESSAGE,
    }
}

pub fn openrouter() -> VendorConfig {
    VendorConfig {
        id: "openrouter",
        display_name: "OpenRouter",
        secret_key: OPENROUTER_SECRET_KEY,
        default_model: "openrouter/optimus-alpha",
        base_url: OPENROUTER_BASE_URL,
        base_url_configurable: false,
        headers: Vec::new(),
        tool_name_transform: None,
        tool_call_streaming: true,
        missing_key_message: OPENROUTER_MISSING_KEY_MESSAGE,
    }
}

pub fn openai() -> VendorConfig {
    VendorConfig {
        id: "openai",
        display_name: "OpenAI",
        secret_key: OPENAI_SECRET_KEY,
        default_model: "gpt-4.1-2025-04-14",
        base_url: OPENAI_BASE_URL,
        base_url_configurable: true,
        headers: Vec::new(),
        tool_name_transform: None,
        tool_call_streaming: false,
        missing_key_message: MISSING_KEY_MESSAGE,
    }
}
