//! Activation: one `StreamAdapter` per vendor plus the remediation task.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::ai_sdk_core::host::{CommandRunner, ConfigSource, PromptKind, SecretStore, UserPrompt};
use crate::ai_sdk_core::logging::Logger;
use crate::ai_sdk_core::remediation::{remediation_channel, RemediationFlow};
use crate::ai_sdk_core::stream_adapter::{HostServices, StreamAdapter};
use crate::ai_sdk_core::transport::TransportConfig;
use crate::ai_sdk_core::upstream::UpstreamClient;
use crate::ai_sdk_core::SdkError;
use crate::ai_sdk_types::ModelRegistration;
use crate::provider::commands::{
    self, KeyCommand, KeyCommandError, KeychainReader, SecurityCliKeychain,
    CLAUDE_CODE_KEY_SET_MESSAGE,
};
use crate::provider::vendors::{registrations, VendorRegistration};

/// Everything the editor host hands to the extension at activation.
#[derive(Clone)]
pub struct BoostHost {
    pub secrets: Arc<dyn SecretStore>,
    pub config: Arc<dyn ConfigSource>,
    pub logger: Arc<dyn Logger>,
    pub prompt: Arc<dyn UserPrompt>,
    pub commands: Arc<dyn CommandRunner>,
}

pub struct BoostExtension {
    host: BoostHost,
    adapters: Vec<StreamAdapter>,
    keychain: Arc<dyn KeychainReader>,
    remediation_task: Option<JoinHandle<()>>,
}

impl BoostExtension {
    /// Build every vendor over the reqwest transport.
    pub fn activate(host: BoostHost, transport_cfg: &TransportConfig) -> Result<Self, SdkError> {
        Self::activate_with(host, |reg| reg.dialect.build_client(transport_cfg))
    }

    /// Build every vendor with a caller-supplied upstream per registration.
    ///
    /// The remediation flow is spawned on the current tokio runtime. Outside
    /// a runtime, missing-key prompts are disabled and only the error is
    /// returned to the caller.
    pub fn activate_with<F>(host: BoostHost, mut build: F) -> Result<Self, SdkError>
    where
        F: FnMut(&VendorRegistration) -> Result<Arc<dyn UpstreamClient>, SdkError>,
    {
        let (sender, rx) = remediation_channel();
        let (remediation, remediation_task) = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let flow = RemediationFlow::new(
                    host.prompt.clone(),
                    host.commands.clone(),
                    host.logger.clone(),
                );
                (Some(sender), Some(handle.spawn(flow.run(rx))))
            }
            Err(_) => {
                host.logger
                    .warn("No async runtime available; missing-key prompts are disabled");
                (None, None)
            }
        };

        let services = HostServices {
            secrets: host.secrets.clone(),
            config: host.config.clone(),
            logger: host.logger.clone(),
            remediation,
        };

        let mut adapters = Vec::with_capacity(registrations().len());
        for reg in registrations() {
            let upstream = build(reg)?;
            let adapter = StreamAdapter::new((reg.config)(), upstream, services.clone());
            host.logger
                .log(&format!("Registered chat model provider: {}", reg.id));
            adapters.push(adapter);
        }

        Ok(Self {
            host,
            adapters,
            keychain: Arc::new(SecurityCliKeychain),
            remediation_task,
        })
    }

    pub fn with_keychain(mut self, keychain: Arc<dyn KeychainReader>) -> Self {
        self.keychain = keychain;
        self
    }

    pub fn adapters(&self) -> &[StreamAdapter] {
        &self.adapters
    }

    pub fn adapter(&self, id: &str) -> Option<&StreamAdapter> {
        self.adapters
            .iter()
            .find(|a| a.vendor().id.eq_ignore_ascii_case(id))
    }

    pub fn registrations(&self) -> Vec<ModelRegistration> {
        self.adapters.iter().map(StreamAdapter::registration).collect()
    }

    /// Run a registered command. The returned value is the key now in effect.
    pub async fn execute_command(&self, command_id: &str) -> Result<Option<String>, KeyCommandError> {
        match KeyCommand::parse(command_id) {
            Some(KeyCommand::SetKey { secret_key }) => Ok(commands::set_api_key(
                self.host.secrets.as_ref(),
                self.host.prompt.as_ref(),
                secret_key,
            )
            .await),
            Some(KeyCommand::SetClaudeCodeKey) => {
                match commands::set_claude_code_key(
                    self.host.secrets.as_ref(),
                    self.keychain.as_ref(),
                )
                .await
                {
                    Ok(token) => {
                        self.host
                            .prompt
                            .show_message(PromptKind::Info, CLAUDE_CODE_KEY_SET_MESSAGE, &[])
                            .await;
                        Ok(Some(token))
                    }
                    Err(err) => {
                        self.host.logger.error(&err.to_string());
                        self.host
                            .prompt
                            .show_message(PromptKind::Error, &err.to_string(), &[])
                            .await;
                        Err(err)
                    }
                }
            }
            None => Err(KeyCommandError::UnknownCommand(command_id.to_string())),
        }
    }

    /// Remove stored keys and stop the remediation task.
    pub async fn deactivate(self) {
        commands::deactivate(self.host.secrets.as_ref()).await;
        if let Some(task) = self.remediation_task {
            task.abort();
        }
    }
}
