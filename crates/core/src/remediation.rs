//! Missing-credential remediation, decoupled from the failing request.
//!
//! The stream adapter only emits a `RemediationRequest` on a channel and
//! rejects immediately. `RemediationFlow` consumes the channel on its own task
//! and walks the user through setting a key and reloading the window.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::host::{CommandRunner, PromptKind, UserPrompt};
use crate::core::logging::Logger;

pub const SET_API_KEY_ACTION: &str = "Set API Key";
pub const RELOAD_WINDOW_ACTION: &str = "Reload Window";
pub const RELOAD_WINDOW_COMMAND: &str = "workbench.action.reloadWindow";
pub const KEY_SET_MESSAGE: &str =
    "API Key set successfully. Please restart the window to apply the changes.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationRequest {
    pub vendor: String,
    pub message: String,
    pub set_key_command: String,
}

#[derive(Debug, Clone)]
pub struct RemediationSender {
    tx: mpsc::UnboundedSender<RemediationRequest>,
}

impl RemediationSender {
    /// Fire-and-forget. Returns false when nobody is listening.
    pub fn request(&self, request: RemediationRequest) -> bool {
        self.tx.send(request).is_ok()
    }
}

pub fn remediation_channel() -> (RemediationSender, mpsc::UnboundedReceiver<RemediationRequest>)
{
    let (tx, rx) = mpsc::unbounded_channel();
    (RemediationSender { tx }, rx)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationOutcome {
    Dismissed,
    KeyCommandFailed,
    KeySet,
    Reloaded,
}

pub struct RemediationFlow {
    prompt: Arc<dyn UserPrompt>,
    commands: Arc<dyn CommandRunner>,
    logger: Arc<dyn Logger>,
}

impl RemediationFlow {
    pub fn new(
        prompt: Arc<dyn UserPrompt>,
        commands: Arc<dyn CommandRunner>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            prompt,
            commands,
            logger,
        }
    }

    pub async fn handle(&self, request: &RemediationRequest) -> RemediationOutcome {
        let choice = self
            .prompt
            .show_message(PromptKind::Error, &request.message, &[SET_API_KEY_ACTION])
            .await;
        if choice.as_deref() != Some(SET_API_KEY_ACTION) {
            return RemediationOutcome::Dismissed;
        }
        if let Err(err) = self.commands.execute(&request.set_key_command).await {
            self.logger.error(&format!(
                "[{}] {} failed: {}",
                request.vendor, request.set_key_command, err
            ));
            return RemediationOutcome::KeyCommandFailed;
        }
        let reload = self
            .prompt
            .show_message(PromptKind::Info, KEY_SET_MESSAGE, &[RELOAD_WINDOW_ACTION])
            .await;
        if reload.as_deref() != Some(RELOAD_WINDOW_ACTION) {
            return RemediationOutcome::KeySet;
        }
        match self.commands.execute(RELOAD_WINDOW_COMMAND).await {
            Ok(()) => RemediationOutcome::Reloaded,
            Err(err) => {
                self.logger
                    .error(&format!("[{}] reload failed: {}", request.vendor, err));
                RemediationOutcome::KeySet
            }
        }
    }

    /// Serve requests until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::UnboundedReceiver<RemediationRequest>) {
        while let Some(request) = rx.recv().await {
            let outcome = self.handle(&request).await;
            tracing::debug!(vendor = %request.vendor, ?outcome, "remediation finished");
        }
    }

    pub fn spawn(self, rx: mpsc::UnboundedReceiver<RemediationRequest>) -> JoinHandle<()> {
        tokio::spawn(self.run(rx))
    }
}
