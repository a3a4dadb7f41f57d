use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::ai_sdk_core::error::SdkError;
use crate::ai_sdk_core::host::{
    CollectingSink, JsonConfigSource, MemorySecretStore, ProgressSink,
};
use crate::ai_sdk_core::logging::{LogLevel, MemoryLogger};
use crate::ai_sdk_core::remediation::remediation_channel;
use crate::ai_sdk_core::stream_adapter::{
    tool_choice_for, HostServices, StreamAdapter, VendorConfig,
};
use crate::ai_sdk_core::tools::gemini_tool_name;
use crate::ai_sdk_core::upstream::{abortable, EventStream, UpstreamClient, UpstreamRequest};
use crate::ai_sdk_types::{
    AssistantPart, ChatMessage, ContentPart, FinishReason, RequestOptions, ResponseFragment, Role,
    StreamEvent, ToolChoice, ToolDeclaration, ToolMode, ToolResultItem, TranslatedMessage,
};

const SECRET: &str = "TestCopilotBoostApiKey";

struct ScriptedUpstream {
    script: Vec<Result<StreamEvent, SdkError>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl ScriptedUpstream {
    fn new(script: Vec<Result<StreamEvent, SdkError>>) -> Arc<Self> {
        Arc::new(Self {
            script,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn clone_event(item: &Result<StreamEvent, SdkError>) -> Result<StreamEvent, SdkError> {
    match item {
        Ok(ev) => Ok(ev.clone()),
        Err(SdkError::Cancelled) => Err(SdkError::Cancelled),
        Err(other) => Err(SdkError::InvalidArgument {
            message: other.to_string(),
        }),
    }
}

#[async_trait]
impl UpstreamClient for ScriptedUpstream {
    async fn open_stream(&self, request: UpstreamRequest) -> Result<EventStream, SdkError> {
        self.requests.lock().unwrap().push(request);
        let items: Vec<_> = self.script.iter().map(clone_event).collect();
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Never yields until the request's abort token fires.
struct HangingUpstream;

#[async_trait]
impl UpstreamClient for HangingUpstream {
    async fn open_stream(&self, request: UpstreamRequest) -> Result<EventStream, SdkError> {
        let first = stream::iter(vec![Ok(StreamEvent::text("partial"))]);
        let rest = stream::pending::<Result<StreamEvent, SdkError>>();
        Ok(abortable(first.chain(rest), request.abort))
    }
}

fn vendor(streaming: bool) -> VendorConfig {
    VendorConfig {
        id: "test",
        display_name: "Test",
        secret_key: SECRET,
        default_model: "default-model",
        base_url: "https://api.test.invalid/v1",
        base_url_configurable: true,
        headers: vec![("x-test", "1")],
        tool_name_transform: None,
        tool_call_streaming: streaming,
        missing_key_message: "No API key set. Please set your API key in the settings.",
    }
}

struct Fixture {
    adapter: StreamAdapter,
    logger: Arc<MemoryLogger>,
}

fn fixture_with(
    vendor: VendorConfig,
    upstream: Arc<dyn UpstreamClient>,
    secrets: MemorySecretStore,
    settings: serde_json::Value,
) -> Fixture {
    let logger = Arc::new(MemoryLogger::new());
    let host = HostServices {
        secrets: Arc::new(secrets),
        config: Arc::new(JsonConfigSource::new(settings)),
        logger: logger.clone(),
        remediation: None,
    };
    Fixture {
        adapter: StreamAdapter::new(vendor, upstream, host),
        logger,
    }
}

fn fixture(upstream: Arc<dyn UpstreamClient>, streaming: bool) -> Fixture {
    fixture_with(
        vendor(streaming),
        upstream,
        MemorySecretStore::with_secret(SECRET, "sk-test"),
        json!({}),
    )
}

fn hello() -> Vec<ChatMessage> {
    vec![ChatMessage::user("hi")]
}

#[tokio::test]
async fn fragments_follow_upstream_order() {
    let upstream = ScriptedUpstream::new(vec![
        Ok(StreamEvent::text("a")),
        Ok(StreamEvent::text("b")),
        Ok(StreamEvent::tool_call("id1", "f", json!({}))),
        Ok(StreamEvent::Finish {
            finish_reason: FinishReason::Stop,
            usage: None,
        }),
    ]);
    let fx = fixture(upstream, false);
    let sink = CollectingSink::new();
    fx.adapter
        .provide_response(&hello(), &RequestOptions::default(), &sink, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        sink.fragments(),
        vec![
            ResponseFragment::text("a"),
            ResponseFragment::text("b"),
            ResponseFragment::tool_call("id1", "f", json!({})),
        ]
    );
    assert_eq!(fx.logger.count_containing(LogLevel::Info, "boostProvider: a"), 1);
}

#[tokio::test]
async fn incomplete_tool_call_is_dropped_with_one_log_line() {
    for (id, name) in [(None, Some("f")), (Some("id1"), None), (None, None)] {
        let upstream = ScriptedUpstream::new(vec![Ok(StreamEvent::ToolCall {
            tool_call_id: id.map(String::from),
            tool_name: name.map(String::from),
            args: json!({}),
        })]);
        let fx = fixture(upstream, false);
        let sink = CollectingSink::new();
        fx.adapter
            .provide_response(&hello(), &RequestOptions::default(), &sink, &CancellationToken::new())
            .await
            .unwrap();
        assert!(sink.fragments().is_empty());
        assert_eq!(
            fx.logger
                .count_containing(LogLevel::Log, "Skipping incomplete tool call"),
            1
        );
    }
}

#[tokio::test]
async fn missing_credential_rejects_before_upstream() {
    let upstream = ScriptedUpstream::new(vec![Ok(StreamEvent::text("never"))]);
    let (remediation, mut rx) = remediation_channel();
    let logger = Arc::new(MemoryLogger::new());
    let host = HostServices {
        secrets: Arc::new(MemorySecretStore::new()),
        config: Arc::new(JsonConfigSource::default()),
        logger: logger.clone(),
        remediation: Some(remediation),
    };
    let adapter = StreamAdapter::new(vendor(false), upstream.clone(), host);
    let sink = CollectingSink::new();
    let err = adapter
        .provide_response(&hello(), &RequestOptions::default(), &sink, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::Authentication { .. }));
    assert_eq!(
        err.to_string(),
        "No API key set. Please set your API key in the settings."
    );
    assert!(upstream.requests().is_empty());
    assert!(sink.fragments().is_empty());

    let request = rx.try_recv().unwrap();
    assert_eq!(request.vendor, "Test");
    assert_eq!(request.set_key_command, "copilot-boost-mode.test.setKey");
}

#[tokio::test]
async fn blank_credential_counts_as_missing() {
    let upstream = ScriptedUpstream::new(vec![]);
    let fx = fixture_with(
        vendor(false),
        upstream.clone(),
        MemorySecretStore::with_secret(SECRET, "  "),
        json!({}),
    );
    let err = fx
        .adapter
        .provide_response(
            &hello(),
            &RequestOptions::default(),
            &CollectingSink::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Authentication { .. }));
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn text_only_stream_reports_two_fragments() {
    let upstream = ScriptedUpstream::new(vec![
        Ok(StreamEvent::text("Hello")),
        Ok(StreamEvent::text(" world")),
        Ok(StreamEvent::StepFinish {
            finish_reason: FinishReason::Stop,
        }),
        Ok(StreamEvent::Finish {
            finish_reason: FinishReason::Stop,
            usage: None,
        }),
    ]);
    let fx = fixture(upstream, true);
    let sink = CollectingSink::new();
    fx.adapter
        .provide_response(&hello(), &RequestOptions::default(), &sink, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(sink.fragments().len(), 2);
    assert_eq!(sink.text(), "Hello world");
}

#[tokio::test]
async fn error_event_rejects_and_keeps_earlier_fragments() {
    let upstream = ScriptedUpstream::new(vec![
        Ok(StreamEvent::text("partial")),
        Ok(StreamEvent::Error {
            message: "overloaded".into(),
            cause: Some(json!({"type": "overloaded_error"})),
        }),
        Ok(StreamEvent::text("after")),
    ]);
    let fx = fixture(upstream, false);
    let sink = CollectingSink::new();
    let err = fx
        .adapter
        .provide_response(&hello(), &RequestOptions::default(), &sink, &CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        SdkError::Stream { message, cause } => {
            assert_eq!(message, "overloaded");
            assert_eq!(cause, Some(json!({"type": "overloaded_error"})));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(sink.fragments(), vec![ResponseFragment::text("partial")]);
    assert_eq!(
        fx.logger
            .count_containing(LogLevel::Error, "[Test] streaming error: overloaded"),
        1
    );
    assert_eq!(
        fx.logger
            .count_containing(LogLevel::Error, "[Test] Streaming error cause:"),
        1
    );
}

#[tokio::test]
async fn transport_error_item_is_surfaced() {
    let upstream = ScriptedUpstream::new(vec![
        Ok(StreamEvent::text("x")),
        Err(SdkError::InvalidArgument {
            message: "socket closed".into(),
        }),
    ]);
    let fx = fixture(upstream, false);
    let sink = CollectingSink::new();
    let err = fx
        .adapter
        .provide_response(&hello(), &RequestOptions::default(), &sink, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("socket closed"));
    assert_eq!(sink.fragments().len(), 1);
}

#[tokio::test]
async fn streaming_artifacts_are_ignored_when_disabled() {
    let script = vec![
        Ok(StreamEvent::ToolCallStreamingStart {
            tool_call_id: "id1".into(),
            tool_name: "f".into(),
        }),
        Ok(StreamEvent::ToolCallDelta {
            tool_call_id: "id1".into(),
            tool_name: "f".into(),
            args_text_delta: "{}".into(),
        }),
        Ok(StreamEvent::tool_call("id1", "f", json!({}))),
    ];

    let fx = fixture(ScriptedUpstream::new(script.iter().map(clone_event).collect()), false);
    let sink = CollectingSink::new();
    fx.adapter
        .provide_response(&hello(), &RequestOptions::default(), &sink, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(sink.tool_call_count(), 1);
    assert_eq!(
        fx.logger
            .count_containing(LogLevel::Log, "Ignoring tool-call-streaming-start:"),
        1
    );
    assert_eq!(
        fx.logger.count_containing(LogLevel::Log, "Ignoring tool-call-delta"),
        1
    );

    let fx = fixture(ScriptedUpstream::new(script), true);
    let sink = CollectingSink::new();
    fx.adapter
        .provide_response(&hello(), &RequestOptions::default(), &sink, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(sink.tool_call_count(), 1);
    assert_eq!(fx.logger.count_containing(LogLevel::Log, "Ignoring"), 0);
}

#[tokio::test]
async fn no_tools_means_no_tool_choice() {
    let upstream = ScriptedUpstream::new(vec![]);
    let fx = fixture(upstream.clone(), false);
    let options = RequestOptions {
        tools: vec![],
        tool_mode: Some(ToolMode::Required),
    };
    fx.adapter
        .provide_response(&hello(), &options, &CollectingSink::new(), &CancellationToken::new())
        .await
        .unwrap();
    let request = &upstream.requests()[0];
    assert!(request.tools.is_none());
    assert!(request.tool_choice.is_none());
}

#[tokio::test]
async fn declared_tools_are_forwarded_with_choice() {
    let upstream = ScriptedUpstream::new(vec![]);
    let fx = fixture(upstream.clone(), false);
    let options = RequestOptions {
        tools: vec![
            ToolDeclaration::new("no_schema", "defaults"),
            ToolDeclaration::new("lookup", "search").with_schema(json!({
                "type": "object",
                "properties": {"q": {"type": "string"}}
            })),
        ],
        tool_mode: Some(ToolMode::Auto),
    };
    fx.adapter
        .provide_response(&hello(), &options, &CollectingSink::new(), &CancellationToken::new())
        .await
        .unwrap();
    let request = &upstream.requests()[0];
    let tools = request.tools.as_ref().unwrap();
    assert_eq!(tools.names().collect::<Vec<_>>(), vec!["no_schema", "lookup"]);
    assert_eq!(
        tools.get("no_schema").unwrap().parameters,
        json!({"type": "object", "properties": {}})
    );
    assert_eq!(request.tool_choice, Some(ToolChoice::Auto));
    assert_eq!(request.headers, vec![("x-test".to_string(), "1".to_string())]);
    assert_eq!(
        fx.logger
            .count_containing(LogLevel::Warn, "Tool 'no_schema' has no input schema"),
        1
    );
}

#[tokio::test]
async fn unconvertible_schema_drops_only_that_tool() {
    let upstream = ScriptedUpstream::new(vec![]);
    let fx = fixture(upstream.clone(), false);
    let options = RequestOptions {
        tools: vec![
            ToolDeclaration::new("broken", "bad schema").with_schema(json!("nope")),
            ToolDeclaration::new("lookup", "search").with_schema(json!({
                "type": "object",
                "properties": {"q": {"type": "string"}}
            })),
        ],
        tool_mode: Some(ToolMode::Required),
    };
    fx.adapter
        .provide_response(&hello(), &options, &CollectingSink::new(), &CancellationToken::new())
        .await
        .unwrap();
    let request = &upstream.requests()[0];
    let tools = request.tools.as_ref().unwrap();
    assert_eq!(tools.names().collect::<Vec<_>>(), vec!["lookup"]);
    assert!(tools.get("broken").is_none());
    assert_eq!(request.tool_choice, Some(ToolChoice::Required));
    assert_eq!(
        fx.logger.count_containing(
            LogLevel::Error,
            "Failed to convert schema for tool 'broken'"
        ),
        1
    );
    assert_eq!(
        fx.logger
            .count_containing(LogLevel::Error, "Tool inputSchema: \"nope\""),
        1
    );
}

#[tokio::test]
async fn lone_unconvertible_tool_leaves_no_tools_and_no_choice() {
    let upstream = ScriptedUpstream::new(vec![]);
    let fx = fixture(upstream.clone(), false);
    let options = RequestOptions {
        tools: vec![ToolDeclaration::new("broken", "bad schema")
            .with_schema(json!({"type": 7}))],
        tool_mode: Some(ToolMode::Required),
    };
    fx.adapter
        .provide_response(&hello(), &options, &CollectingSink::new(), &CancellationToken::new())
        .await
        .unwrap();
    let request = &upstream.requests()[0];
    assert!(request.tools.is_none());
    assert!(request.tool_choice.is_none());
    assert_eq!(
        fx.logger
            .count_containing(LogLevel::Error, "Failed to convert schema"),
        1
    );
}

#[tokio::test]
async fn gemini_transform_renames_tools_and_history() {
    let upstream = ScriptedUpstream::new(vec![]);
    let mut gemini = vendor(true);
    gemini.tool_name_transform = Some(gemini_tool_name);
    let fx = fixture_with(
        gemini,
        upstream.clone(),
        MemorySecretStore::with_secret(SECRET, "k"),
        json!({}),
    );
    let history = vec![
        ChatMessage::user("weather?"),
        ChatMessage::new(
            Role::Assistant,
            vec![ContentPart::tool_call("c1", "weather-lookup!", json!({}))],
        ),
        ChatMessage::new(
            Role::User,
            vec![ContentPart::tool_result("c1", vec![ToolResultItem::text("sunny")])],
        ),
    ];
    let options = RequestOptions {
        tools: vec![ToolDeclaration::new("weather-lookup!", "weather")
            .with_schema(json!({"type": "object", "properties": {}}))],
        tool_mode: Some(ToolMode::Required),
    };
    fx.adapter
        .provide_response(&history, &options, &CollectingSink::new(), &CancellationToken::new())
        .await
        .unwrap();

    let request = &upstream.requests()[0];
    let tools = request.tools.as_ref().unwrap();
    assert_eq!(tools.names().collect::<Vec<_>>(), vec!["weather_lookup_"]);
    assert_eq!(request.tool_choice, Some(ToolChoice::Required));
    match &request.messages[1] {
        TranslatedMessage::Assistant { content } => assert!(matches!(
            &content[0],
            AssistantPart::ToolCall { tool_name, .. } if tool_name == "weather_lookup_"
        )),
        other => panic!("unexpected message: {other:?}"),
    }
    match &request.messages[2] {
        TranslatedMessage::Tool { content } => assert_eq!(content[0].tool_name, "weather_lookup_"),
        other => panic!("unexpected message: {other:?}"),
    }
    assert_eq!(
        fx.logger.count_containing(
            LogLevel::Info,
            "Tool name converted: \"weather-lookup!\" -> \"weather_lookup_\""
        ),
        1
    );
}

#[tokio::test]
async fn model_and_base_url_come_from_settings() {
    let upstream = ScriptedUpstream::new(vec![]);
    let fx = fixture_with(
        vendor(false),
        upstream.clone(),
        MemorySecretStore::with_secret(SECRET, "k"),
        json!({"copilot-boost-mode.test": {"modelName": "custom", "baseURL": "https://proxy.local/v1/"}}),
    );
    fx.adapter
        .provide_response(
            &hello(),
            &RequestOptions::default(),
            &CollectingSink::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    let request = &upstream.requests()[0];
    assert_eq!(request.model, "custom");
    assert_eq!(request.base_url, "https://proxy.local/v1");
    assert_eq!(request.api_key, "k");
}

#[tokio::test]
async fn fixed_base_url_ignores_settings() {
    let mut fixed = vendor(false);
    fixed.base_url_configurable = false;
    let fx = fixture_with(
        fixed,
        ScriptedUpstream::new(vec![]),
        MemorySecretStore::new(),
        json!({"copilot-boost-mode.test": {"baseURL": "https://elsewhere"}}),
    );
    assert_eq!(fx.adapter.resolve_base_url(), "https://api.test.invalid/v1");
    assert_eq!(fx.adapter.resolve_model(), "default-model");
}

#[tokio::test]
async fn invalid_base_url_falls_back_with_warning() {
    let fx = fixture_with(
        vendor(false),
        ScriptedUpstream::new(vec![]),
        MemorySecretStore::new(),
        json!({"copilot-boost-mode.test": {"baseURL": "not a url"}}),
    );
    assert_eq!(fx.adapter.resolve_base_url(), "https://api.test.invalid/v1");
    assert_eq!(
        fx.logger.count_containing(LogLevel::Warn, "Ignoring invalid baseURL"),
        1
    );
}

/// Cancels the request as soon as the first fragment arrives.
struct CancellingSink {
    inner: CollectingSink,
    token: CancellationToken,
}

impl ProgressSink for CancellingSink {
    fn report(&self, fragment: ResponseFragment) {
        self.inner.report(fragment);
        self.token.cancel();
    }
}

#[tokio::test]
async fn cancellation_aborts_the_stream() {
    let fx = fixture(Arc::new(HangingUpstream), false);
    let cancel = CancellationToken::new();
    let sink = CancellingSink {
        inner: CollectingSink::new(),
        token: cancel.clone(),
    };
    let err = fx
        .adapter
        .provide_response(&hello(), &RequestOptions::default(), &sink, &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancellation());
    assert_eq!(sink.inner.fragments(), vec![ResponseFragment::text("partial")]);
    assert_eq!(
        fx.logger.count_containing(LogLevel::Error, "[Test] streaming error: cancelled"),
        1
    );
}

#[tokio::test]
async fn token_count_is_constant() {
    let fx = fixture(ScriptedUpstream::new(vec![]), false);
    assert_eq!(fx.adapter.provide_token_count("anything at all").await.unwrap(), 1);
}

#[test]
fn tool_choice_requires_tools() {
    assert_eq!(tool_choice_for(Some(ToolMode::Required), false), None);
    assert_eq!(tool_choice_for(Some(ToolMode::Auto), false), None);
    assert_eq!(
        tool_choice_for(Some(ToolMode::Required), true),
        Some(ToolChoice::Required)
    );
    assert_eq!(tool_choice_for(Some(ToolMode::Auto), true), Some(ToolChoice::Auto));
    assert_eq!(tool_choice_for(None, true), None);
}

#[test]
fn registration_uses_vendor_identity() {
    let fx = fixture(ScriptedUpstream::new(vec![]), false);
    let reg = fx.adapter.registration();
    assert_eq!(reg.id, "test");
    assert_eq!(reg.name, "Test");
    assert_eq!(reg.vendor, "boost");
}
