//! One generic chat-provider implementation, parameterized per vendor.
//!
//! A `StreamAdapter` owns a `VendorConfig` (static data: defaults, headers,
//! tool-name rule, tool-call streaming policy) and an `UpstreamClient` that
//! speaks the vendor's wire dialect. `provide_response` translates the host
//! turn, opens one upstream stream and forwards events to the progress sink
//! in arrival order.

use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::ai_sdk_types::{
    AssistantPart, ChatMessage, ModelRegistration, RequestOptions, ResponseFragment, StreamEvent,
    ToolChoice, ToolMode, TranslatedMessage,
};
use crate::core::error::SdkError;
use crate::core::host::{ConfigSource, ProgressSink, SecretStore};
use crate::core::logging::{log_tool_configuration, Logger};
use crate::core::message_adapter::translate_conversation;
use crate::core::remediation::{RemediationRequest, RemediationSender};
use crate::core::tools::{normalize_tools, ToolNameTransform};
use crate::core::upstream::{UpstreamClient, UpstreamRequest};

pub const CONFIG_SECTION_PREFIX: &str = "copilot-boost-mode";
pub const MODEL_NAME_KEY: &str = "modelName";
pub const BASE_URL_KEY: &str = "baseURL";

/// Static per-vendor data. No behavior beyond the optional name transform.
#[derive(Debug, Clone)]
pub struct VendorConfig {
    /// Short id used in settings sections and command ids (e.g. `groq`).
    pub id: &'static str,
    /// Display name, also the log prefix.
    pub display_name: &'static str,
    pub secret_key: &'static str,
    pub default_model: &'static str,
    pub base_url: &'static str,
    /// Whether `baseURL` may be overridden from settings.
    pub base_url_configurable: bool,
    pub headers: Vec<(&'static str, &'static str)>,
    pub tool_name_transform: Option<ToolNameTransform>,
    pub tool_call_streaming: bool,
    pub missing_key_message: &'static str,
}

impl VendorConfig {
    pub fn config_section(&self) -> String {
        format!("{CONFIG_SECTION_PREFIX}.{}", self.id)
    }

    pub fn set_key_command(&self) -> String {
        format!("{CONFIG_SECTION_PREFIX}.{}.setKey", self.id)
    }
}

/// Host capabilities shared by every adapter.
#[derive(Clone)]
pub struct HostServices {
    pub secrets: Arc<dyn SecretStore>,
    pub config: Arc<dyn ConfigSource>,
    pub logger: Arc<dyn Logger>,
    pub remediation: Option<RemediationSender>,
}

pub fn tool_choice_for(mode: Option<ToolMode>, has_tools: bool) -> Option<ToolChoice> {
    if !has_tools {
        return None;
    }
    match mode {
        Some(ToolMode::Required) => Some(ToolChoice::Required),
        Some(ToolMode::Auto) => Some(ToolChoice::Auto),
        None => None,
    }
}

pub struct StreamAdapter {
    vendor: VendorConfig,
    upstream: Arc<dyn UpstreamClient>,
    host: HostServices,
}

impl StreamAdapter {
    pub fn new(vendor: VendorConfig, upstream: Arc<dyn UpstreamClient>, host: HostServices) -> Self {
        Self {
            vendor,
            upstream,
            host,
        }
    }

    pub fn vendor(&self) -> &VendorConfig {
        &self.vendor
    }

    pub fn registration(&self) -> ModelRegistration {
        ModelRegistration::boost(self.vendor.id, self.vendor.display_name)
    }

    pub fn resolve_model(&self) -> String {
        self.host
            .config
            .get_string(&self.vendor.config_section(), MODEL_NAME_KEY)
            .unwrap_or_else(|| self.vendor.default_model.to_string())
    }

    /// Configured `baseURL` when the vendor allows one and it parses,
    /// otherwise the vendor default.
    pub fn resolve_base_url(&self) -> String {
        if self.vendor.base_url_configurable {
            if let Some(raw) = self
                .host
                .config
                .get_string(&self.vendor.config_section(), BASE_URL_KEY)
            {
                match url::Url::parse(&raw) {
                    Ok(_) => return raw.trim_end_matches('/').to_string(),
                    Err(err) => self.host.logger.warn(&format!(
                        "[{}] Ignoring invalid baseURL '{raw}': {err}",
                        self.vendor.display_name
                    )),
                }
            }
        }
        self.vendor.base_url.to_string()
    }

    /// Current credential, or the authentication error plus a remediation
    /// request on the side channel.
    pub async fn require_credential(&self) -> Result<String, SdkError> {
        match self.host.secrets.get(self.vendor.secret_key).await {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => {
                let message = self.vendor.missing_key_message;
                self.host.logger.error(&format!(
                    "[{}] {message}",
                    self.vendor.display_name
                ));
                if let Some(remediation) = &self.host.remediation {
                    remediation.request(RemediationRequest {
                        vendor: self.vendor.display_name.to_string(),
                        message: message.to_string(),
                        set_key_command: self.vendor.set_key_command(),
                    });
                }
                Err(SdkError::authentication(message))
            }
        }
    }

    pub async fn provide_response(
        &self,
        messages: &[ChatMessage],
        options: &RequestOptions,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<(), SdkError> {
        let api_key = self.require_credential().await?;
        let logger = self.host.logger.as_ref();
        let vendor = self.vendor.display_name;

        let model = self.resolve_model();
        let base_url = self.resolve_base_url();
        let abort = cancel.child_token();

        let normalized = normalize_tools(
            &options.tools,
            self.vendor.tool_name_transform,
            vendor,
            logger,
        );
        let tool_choice = tool_choice_for(options.tool_mode, normalized.has_tools);
        let mut translated = translate_conversation(messages, logger);
        if let Some(transform) = self.vendor.tool_name_transform {
            rename_history_tools(&mut translated, transform);
        }

        log_tool_configuration(
            logger,
            vendor,
            normalized.has_tools,
            &normalized.tools,
            &model,
            tool_choice,
            &[("toolCallStreaming", json!(self.vendor.tool_call_streaming))],
        );
        logger.info(&format!("[{vendor}] baseURL: {base_url}"));
        logger.log(&format!(
            "Stream config: {}",
            json!({
                "model": "omitted",
                "messages": "omitted",
                "toolChoice": tool_choice.map(|c| c.as_str()),
                "tools": if normalized.has_tools {
                    serde_json::to_value(&normalized.tools).unwrap_or(Value::Null)
                } else {
                    Value::Null
                },
                "toolCallStreaming": self.vendor.tool_call_streaming,
            })
        ));

        let request = UpstreamRequest {
            vendor: vendor.to_string(),
            model,
            messages: translated,
            tools: normalized.has_tools.then_some(normalized.tools),
            tool_choice,
            api_key,
            base_url,
            headers: self
                .vendor
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            tool_call_streaming: self.vendor.tool_call_streaming,
            abort,
        };

        let result = self.run_event_loop(request, sink).await;
        if let Err(err) = &result {
            logger.error(&format!("[{vendor}] streaming error: {err}"));
            if let Some(cause) = err.cause_detail() {
                logger.error(&format!("[{vendor}] Streaming error cause: {cause}"));
            }
        }
        result
    }

    async fn run_event_loop(
        &self,
        request: UpstreamRequest,
        sink: &dyn ProgressSink,
    ) -> Result<(), SdkError> {
        let logger = self.host.logger.as_ref();
        let streaming_tool_calls = request.tool_call_streaming;
        let mut events = self.upstream.open_stream(request).await?;

        while let Some(event) = events.next().await {
            match event? {
                StreamEvent::TextDelta { delta } => {
                    sink.report(ResponseFragment::text(delta.clone()));
                    logger.info(&format!("boostProvider: {delta}"));
                }
                StreamEvent::ToolCall {
                    tool_call_id: Some(id),
                    tool_name: Some(name),
                    args,
                } => sink.report(ResponseFragment::tool_call(id, name, args)),
                incomplete @ StreamEvent::ToolCall { .. } => {
                    logger.log(&format!(
                        "Skipping incomplete tool call: {}",
                        incomplete.to_log_json()
                    ));
                }
                start @ StreamEvent::ToolCallStreamingStart { .. } => {
                    if !streaming_tool_calls {
                        logger.log(&format!(
                            "Ignoring tool-call-streaming-start: {}",
                            start.to_log_json()
                        ));
                    }
                }
                StreamEvent::ToolCallDelta { .. } => {
                    if !streaming_tool_calls {
                        logger.log("Ignoring tool-call-delta");
                    }
                }
                StreamEvent::StepFinish { .. } | StreamEvent::Finish { .. } => {}
                StreamEvent::Error { message, cause } => {
                    return Err(SdkError::Stream { message, cause });
                }
            }
        }
        Ok(())
    }

    /// Constant count; no tokenizer is consulted.
    pub async fn provide_token_count(&self, _text: &str) -> Result<u32, SdkError> {
        Ok(1)
    }
}

/// Apply the vendor tool-name rule to tool names already in the history so
/// they match the declared (renamed) tools.
fn rename_history_tools(messages: &mut [TranslatedMessage], transform: ToolNameTransform) {
    for message in messages {
        match message {
            TranslatedMessage::Assistant { content } => {
                for part in content {
                    if let AssistantPart::ToolCall { tool_name, .. } = part {
                        *tool_name = transform(tool_name);
                    }
                }
            }
            TranslatedMessage::Tool { content } => {
                for part in content {
                    part.tool_name = transform(&part.tool_name);
                }
            }
            TranslatedMessage::System { .. } | TranslatedMessage::User { .. } => {}
        }
    }
}
