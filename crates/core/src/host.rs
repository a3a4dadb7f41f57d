//! Capabilities the editor host provides to the core.
//!
//! Every collaborator is a trait object so adapters can be driven by the real
//! host, by a channel, or by the in-memory implementations below in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};

use crate::ai_sdk_types::ResponseFragment;
use crate::core::error::SdkError;

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn store(&self, key: &str, value: &str);
    async fn delete(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(key: &str, value: &str) -> Self {
        let mut map = HashMap::new();
        map.insert(key.to_string(), value.to_string());
        Self {
            secrets: RwLock::new(map),
        }
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.secrets.read().await.get(key).cloned()
    }

    async fn store(&self, key: &str, value: &str) {
        self.secrets
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }

    async fn delete(&self, key: &str) {
        self.secrets.write().await.remove(key);
    }
}

/// Read access to per-vendor settings.
pub trait ConfigSource: Send + Sync {
    fn get(&self, section: &str, key: &str) -> Option<Value>;

    /// Non-empty string value, trimmed.
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.get(section, key)
            .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
    }
}

/// Settings held as editor-style JSON.
///
/// Both nested (`{"copilot-boost-mode.openai": {"modelName": ".."}}`) and
/// flattened (`{"copilot-boost-mode.openai.modelName": ".."}`) layouts are
/// accepted; the nested form wins when both are present.
#[derive(Debug, Clone, Default)]
pub struct JsonConfigSource {
    settings: Value,
}

impl JsonConfigSource {
    pub fn new(settings: Value) -> Self {
        Self { settings }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SdkError> {
        let settings: Value = serde_json::from_str(raw)?;
        if !settings.is_object() {
            return Err(SdkError::InvalidArgument {
                message: "settings must be a JSON object".into(),
            });
        }
        Ok(Self { settings })
    }
}

impl ConfigSource for JsonConfigSource {
    fn get(&self, section: &str, key: &str) -> Option<Value> {
        self.settings
            .get(section)
            .and_then(|s| s.get(key))
            .or_else(|| self.settings.get(format!("{section}.{key}")))
            .filter(|v| !v.is_null())
            .cloned()
    }
}

/// Destination for response fragments, reported in arrival order.
pub trait ProgressSink: Send + Sync {
    fn report(&self, fragment: ResponseFragment);
}

impl ProgressSink for mpsc::UnboundedSender<ResponseFragment> {
    fn report(&self, fragment: ResponseFragment) {
        // A closed receiver means the host stopped listening; nothing to do.
        let _ = self.send(fragment);
    }
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    fragments: Mutex<Vec<ResponseFragment>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragments(&self) -> Vec<ResponseFragment> {
        self.fragments.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// Concatenation of every text fragment.
    pub fn text(&self) -> String {
        self.fragments()
            .into_iter()
            .filter_map(|f| match f {
                ResponseFragment::Text { value } => Some(value),
                ResponseFragment::ToolCall { .. } => None,
            })
            .collect()
    }

    pub fn tool_call_count(&self) -> usize {
        self.fragments()
            .iter()
            .filter(|f| matches!(f, ResponseFragment::ToolCall { .. }))
            .count()
    }
}

impl ProgressSink for CollectingSink {
    fn report(&self, fragment: ResponseFragment) {
        if let Ok(mut fragments) = self.fragments.lock() {
            fragments.push(fragment);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Error,
    Info,
}

/// Interactive prompts owned by the host UI.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Show `message` with `actions`; resolves to the chosen action, if any.
    async fn show_message(&self, kind: PromptKind, message: &str, actions: &[&str])
        -> Option<String>;

    async fn input_box(&self, prompt: &str) -> Option<String>;
}

/// Executes host commands by id.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, command: &str) -> Result<(), SdkError>;
}
