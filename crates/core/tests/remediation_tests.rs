use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ai_sdk_core::error::SdkError;
use crate::ai_sdk_core::host::{CommandRunner, PromptKind, UserPrompt};
use crate::ai_sdk_core::logging::{LogLevel, MemoryLogger};
use crate::ai_sdk_core::remediation::{
    remediation_channel, RemediationFlow, RemediationOutcome, RemediationRequest,
    KEY_SET_MESSAGE, RELOAD_WINDOW_ACTION, RELOAD_WINDOW_COMMAND, SET_API_KEY_ACTION,
};

#[derive(Default)]
struct ScriptedPrompt {
    answers: Mutex<VecDeque<Option<String>>>,
    shown: Mutex<Vec<(PromptKind, String, Vec<String>)>>,
}

impl ScriptedPrompt {
    fn answering(answers: &[Option<&str>]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().map(|a| a.map(String::from)).collect()),
            shown: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl UserPrompt for ScriptedPrompt {
    async fn show_message(
        &self,
        kind: PromptKind,
        message: &str,
        actions: &[&str],
    ) -> Option<String> {
        self.shown.lock().unwrap().push((
            kind,
            message.to_string(),
            actions.iter().map(|a| a.to_string()).collect(),
        ));
        self.answers.lock().unwrap().pop_front().flatten()
    }

    async fn input_box(&self, _prompt: &str) -> Option<String> {
        None
    }
}

#[derive(Default)]
struct RecordingCommands {
    executed: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl CommandRunner for RecordingCommands {
    async fn execute(&self, command: &str) -> Result<(), SdkError> {
        self.executed.lock().unwrap().push(command.to_string());
        if self.fail {
            return Err(SdkError::InvalidArgument {
                message: format!("unknown command {command}"),
            });
        }
        Ok(())
    }
}

fn request() -> RemediationRequest {
    RemediationRequest {
        vendor: "Groq".into(),
        message: "No API key set. Please set your API key in the settings.".into(),
        set_key_command: "copilot-boost-mode.groq.setKey".into(),
    }
}

#[tokio::test]
async fn accepting_both_prompts_sets_key_and_reloads() {
    let prompt = ScriptedPrompt::answering(&[Some(SET_API_KEY_ACTION), Some(RELOAD_WINDOW_ACTION)]);
    let commands = Arc::new(RecordingCommands::default());
    let flow = RemediationFlow::new(prompt.clone(), commands.clone(), Arc::new(MemoryLogger::new()));

    assert_eq!(flow.handle(&request()).await, RemediationOutcome::Reloaded);
    assert_eq!(
        *commands.executed.lock().unwrap(),
        vec!["copilot-boost-mode.groq.setKey", RELOAD_WINDOW_COMMAND]
    );
    let shown = prompt.shown.lock().unwrap();
    assert_eq!(shown[0].0, PromptKind::Error);
    assert_eq!(shown[0].2, vec![SET_API_KEY_ACTION]);
    assert_eq!(shown[1].1, KEY_SET_MESSAGE);
}

#[tokio::test]
async fn dismissing_runs_no_commands() {
    let prompt = ScriptedPrompt::answering(&[None]);
    let commands = Arc::new(RecordingCommands::default());
    let flow = RemediationFlow::new(prompt, commands.clone(), Arc::new(MemoryLogger::new()));
    assert_eq!(flow.handle(&request()).await, RemediationOutcome::Dismissed);
    assert!(commands.executed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn declining_reload_keeps_key() {
    let prompt = ScriptedPrompt::answering(&[Some(SET_API_KEY_ACTION), None]);
    let commands = Arc::new(RecordingCommands::default());
    let flow = RemediationFlow::new(prompt, commands.clone(), Arc::new(MemoryLogger::new()));
    assert_eq!(flow.handle(&request()).await, RemediationOutcome::KeySet);
    assert_eq!(commands.executed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failing_key_command_is_logged() {
    let prompt = ScriptedPrompt::answering(&[Some(SET_API_KEY_ACTION)]);
    let commands = Arc::new(RecordingCommands {
        executed: Mutex::new(Vec::new()),
        fail: true,
    });
    let logger = Arc::new(MemoryLogger::new());
    let flow = RemediationFlow::new(prompt, commands, logger.clone());
    assert_eq!(
        flow.handle(&request()).await,
        RemediationOutcome::KeyCommandFailed
    );
    assert_eq!(
        logger.count_containing(LogLevel::Error, "copilot-boost-mode.groq.setKey failed"),
        1
    );
}

#[tokio::test]
async fn spawned_flow_drains_channel_until_senders_drop() {
    let prompt = ScriptedPrompt::answering(&[None, None]);
    let (sender, rx) = remediation_channel();
    let handle = RemediationFlow::new(
        prompt.clone(),
        Arc::new(RecordingCommands::default()),
        Arc::new(MemoryLogger::new()),
    )
    .spawn(rx);

    assert!(sender.request(request()));
    assert!(sender.request(request()));
    drop(sender);
    handle.await.unwrap();
    assert_eq!(prompt.shown.lock().unwrap().len(), 2);
}
