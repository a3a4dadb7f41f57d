//! Key management commands.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::ai_sdk_core::host::{SecretStore, UserPrompt};
use crate::ai_sdk_core::stream_adapter::CONFIG_SECTION_PREFIX;
use crate::provider::vendors::{self, ANTHROPIC_SECRET_KEY, DEACTIVATE_SECRET_KEYS};

pub const API_KEY_PROMPT: &str = "Enter your API Key";
pub const CLAUDE_CODE_KEYCHAIN_SERVICE: &str = "Claude Code-credentials";
pub const CLAUDE_CODE_KEY_SET_MESSAGE: &str = "Claude Code API key set successfully from Keychain";
pub const SET_CLAUDE_CODE_KEY_COMMAND: &str = "copilot-boost-mode.anthropic.setClaudeCodeKey";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyCommandError {
    #[error("This command is only available on macOS")]
    UnsupportedPlatform,
    #[error("Could not retrieve Claude Code credentials from Keychain")]
    EmptyCredentials,
    #[error("Could not parse Anthropic API key from Keychain data")]
    MissingAccessToken,
    #[error("Error retrieving Claude Code API key: {0}")]
    Retrieval(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// A command the extension registers with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Prompt for and store the key of one vendor.
    SetKey { secret_key: &'static str },
    SetClaudeCodeKey,
}

impl KeyCommand {
    pub fn parse(command_id: &str) -> Option<Self> {
        if command_id == SET_CLAUDE_CODE_KEY_COMMAND {
            return Some(KeyCommand::SetClaudeCodeKey);
        }
        let vendor = command_id
            .strip_prefix(CONFIG_SECTION_PREFIX)?
            .strip_prefix('.')?
            .strip_suffix(".setKey")?;
        let reg = vendors::find(vendor)?;
        Some(KeyCommand::SetKey {
            secret_key: (reg.config)().secret_key,
        })
    }
}

/// Every command id, in registration order.
pub fn command_ids() -> Vec<String> {
    let mut ids: Vec<String> = vendors::registrations()
        .iter()
        .map(|reg| (reg.config)().set_key_command())
        .collect();
    ids.push(SET_CLAUDE_CODE_KEY_COMMAND.to_string());
    ids
}

/// Source of the raw secret stored by the Claude Code CLI.
#[async_trait]
pub trait KeychainReader: Send + Sync {
    async fn read_generic_password(&self, service: &str) -> Result<String, KeyCommandError>;
}

/// Reads the macOS login keychain through the `security` CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityCliKeychain;

#[async_trait]
impl KeychainReader for SecurityCliKeychain {
    async fn read_generic_password(&self, service: &str) -> Result<String, KeyCommandError> {
        if !cfg!(target_os = "macos") {
            return Err(KeyCommandError::UnsupportedPlatform);
        }
        let output = tokio::process::Command::new("security")
            .args(["find-generic-password", "-s", service, "-w"])
            .output()
            .await
            .map_err(|err| KeyCommandError::Retrieval(err.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KeyCommandError::Retrieval(format!(
                "security exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Ask for a key and store it. A blank answer keeps the current secret,
/// which is returned instead.
pub async fn set_api_key(
    secrets: &dyn SecretStore,
    prompt: &dyn UserPrompt,
    secret_key: &str,
) -> Option<String> {
    match prompt.input_box(API_KEY_PROMPT).await {
        Some(value) if !value.is_empty() => {
            secrets.store(secret_key, &value).await;
            Some(value)
        }
        _ => secrets.get(secret_key).await,
    }
}

/// `claudeAiOauth.accessToken` from the keychain payload.
pub fn parse_claude_code_credentials(raw: &str) -> Result<String, KeyCommandError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(KeyCommandError::EmptyCredentials);
    }
    let parsed: Value =
        serde_json::from_str(raw).map_err(|err| KeyCommandError::Retrieval(err.to_string()))?;
    parsed
        .get("claudeAiOauth")
        .and_then(|o| o.get("accessToken"))
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty() && *token != "null")
        .map(str::to_string)
        .ok_or(KeyCommandError::MissingAccessToken)
}

/// Copy the Claude Code OAuth token into the Anthropic secret.
pub async fn set_claude_code_key(
    secrets: &dyn SecretStore,
    keychain: &dyn KeychainReader,
) -> Result<String, KeyCommandError> {
    let raw = keychain
        .read_generic_password(CLAUDE_CODE_KEYCHAIN_SERVICE)
        .await?;
    let token = parse_claude_code_credentials(&raw)?;
    secrets.store(ANTHROPIC_SECRET_KEY, &token).await;
    Ok(token)
}

pub async fn deactivate(secrets: &dyn SecretStore) {
    for key in DEACTIVATE_SECRET_KEYS {
        secrets.delete(key).await;
    }
}
