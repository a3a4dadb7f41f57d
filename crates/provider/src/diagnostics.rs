//! Smoke checks against the live vendors.

use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::ai_sdk_core::host::CollectingSink;
use crate::ai_sdk_core::logging::Logger;
use crate::ai_sdk_core::stream_adapter::StreamAdapter;
use crate::ai_sdk_types::{
    ChatMessage, ModelRegistration, RequestOptions, ResponseFragment, ToolDeclaration, ToolMode,
};

pub const GREETING_PROMPT: &str = "Hello! Can you respond with a simple greeting?";
pub const TOOL_PROMPT: &str = "What time is it now? Use the get_current_time tool.";

/// Vendors that also get the tool round.
const TOOL_ROUND_VENDORS: [&str; 3] = ["anthropic", "openai", "groq"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatModelSelector {
    pub vendor: Option<String>,
    pub family: Option<String>,
}

pub fn select_chat_models<'a>(
    registrations: &'a [ModelRegistration],
    selector: &ChatModelSelector,
) -> Vec<&'a ModelRegistration> {
    registrations
        .iter()
        .filter(|r| selector.vendor.as_deref().map_or(true, |v| r.vendor == v))
        .filter(|r| selector.family.as_deref().map_or(true, |f| r.family == f))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmokeReport {
    pub vendor: String,
    /// `None` when the greeting round failed.
    pub greeting: Option<String>,
    /// Tool calls seen in the tool round, when one ran and succeeded.
    pub tool_calls: Option<usize>,
}

/// Greeting round, then a `get_current_time` round for tool-capable vendors.
/// Failures are logged and reflected in the report.
pub async fn smoke_test(adapter: &StreamAdapter, logger: &dyn Logger) -> SmokeReport {
    let vendor = adapter.vendor();
    let mut report = SmokeReport {
        vendor: vendor.id.to_string(),
        ..SmokeReport::default()
    };

    logger.log(&format!("Sending request to {}...", vendor.display_name));
    let sink = CollectingSink::new();
    let cancel = CancellationToken::new();
    match adapter
        .provide_response(
            &[ChatMessage::user(GREETING_PROMPT)],
            &RequestOptions::default(),
            &sink,
            &cancel,
        )
        .await
    {
        Ok(()) => {
            let text = sink.text();
            logger.log(&format!(
                "Response from {}: {}",
                vendor.display_name,
                text.trim()
            ));
            report.greeting = Some(text);
        }
        Err(err) => {
            logger.error(&format!("Error testing model {}: {err}", vendor.display_name));
            return report;
        }
    }

    if TOOL_ROUND_VENDORS.contains(&vendor.id) {
        report.tool_calls = tool_round(adapter, logger).await;
    }
    report
}

async fn tool_round(adapter: &StreamAdapter, logger: &dyn Logger) -> Option<usize> {
    let name = adapter.vendor().display_name;
    logger.log(&format!("Testing {name} with tools..."));
    let options = RequestOptions {
        tools: vec![
            ToolDeclaration::new("get_current_time", "Get the current time").with_schema(json!({})),
        ],
        tool_mode: Some(ToolMode::Auto),
    };
    let sink = CollectingSink::new();
    let cancel = CancellationToken::new();
    if let Err(err) = adapter
        .provide_response(&[ChatMessage::user(TOOL_PROMPT)], &options, &sink, &cancel)
        .await
    {
        logger.error(&format!("Error testing {name} with tools: {err}"));
        return None;
    }
    for fragment in sink.fragments() {
        if let ResponseFragment::ToolCall {
            name: tool, input, ..
        } = fragment
        {
            logger.log(&format!("Tool call: {tool} with args: {input}"));
        }
    }
    let count = sink.tool_call_count();
    logger.log(&format!(
        "Tool test response from {name}: {}",
        sink.text().trim()
    ));
    logger.log(&format!("Tool calls made: {count}"));
    Some(count)
}

/// Smoke-test every boost model in `adapters`.
pub async fn smoke_test_all(adapters: &[StreamAdapter], logger: &dyn Logger) -> Vec<SmokeReport> {
    let registrations: Vec<ModelRegistration> =
        adapters.iter().map(StreamAdapter::registration).collect();
    let selector = ChatModelSelector {
        vendor: Some("boost".into()),
        family: Some("boost".into()),
    };
    let selected = select_chat_models(&registrations, &selector);
    logger.log(&format!("Found {} boost language models", selected.len()));

    let mut reports = Vec::with_capacity(selected.len());
    for reg in selected {
        if let Some(adapter) = adapters.iter().find(|a| a.vendor().id == reg.id) {
            logger.log(&format!("Testing model: {} ({})", reg.name, reg.id));
            reports.push(smoke_test(adapter, logger).await);
        }
    }
    reports
}
