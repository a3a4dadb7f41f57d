use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};

use crate::ai_sdk_core::transport::{merge_headers, HttpTransport, TransportConfig};
use crate::ai_sdk_core::upstream::{until_aborted, EventStream, UpstreamClient, UpstreamRequest};
use crate::ai_sdk_core::SdkError;
use crate::ai_sdk_streaming_sse::sse_event_stream;
use crate::provider_openai_compatible::chat::convert::convert_to_openai_compatible_chat_messages as convert_messages;
use crate::provider_openai_compatible::chat::prepare_tools::prepare_tools;
use crate::provider_openai_compatible::error::map_transport_error_to_sdk_error;
use crate::provider_openai_compatible::stream::OpenAICompatibleChatChunk;

const TRACE_PREFIX: &str = "[OPENAI-COMP-CHAT]";

fn default_headers_for_key(api_key: &str) -> Vec<(String, String)> {
    vec![
        ("content-type".to_string(), "application/json".to_string()),
        ("accept".to_string(), "text/event-stream".to_string()),
        ("authorization".to_string(), format!("Bearer {}", api_key)),
    ]
}

/// Streaming Chat Completions body for `request`.
pub fn build_chat_request_body(request: &UpstreamRequest) -> JsonValue {
    let prep = prepare_tools(&request.tools, &request.tool_choice);
    let mut body = Map::new();
    body.insert("model".into(), json!(request.model));
    body.insert(
        "messages".into(),
        JsonValue::Array(convert_messages(&request.messages)),
    );
    if let Some(tools) = prep.tools {
        body.insert("tools".into(), JsonValue::Array(tools));
    }
    if let Some(choice) = prep.tool_choice {
        body.insert("tool_choice".into(), choice);
    }
    body.insert("stream".into(), JsonValue::Bool(true));
    body.insert("stream_options".into(), json!({"include_usage": true}));
    JsonValue::Object(body)
}

/// Client for OpenAI, Groq, OpenRouter and any other `/chat/completions`
/// endpoint with bearer auth.
pub struct OpenAICompatibleChatClient<T: HttpTransport = crate::reqwest_transport::ReqwestTransport> {
    http: T,
    transport_cfg: TransportConfig,
}

impl OpenAICompatibleChatClient {
    pub fn new(transport_cfg: TransportConfig) -> Result<Self, SdkError> {
        let http = crate::reqwest_transport::ReqwestTransport::try_new(&transport_cfg)
            .map_err(SdkError::Transport)?;
        Ok(Self {
            http,
            transport_cfg,
        })
    }
}

impl<T: HttpTransport> OpenAICompatibleChatClient<T> {
    pub fn with_transport(http: T, transport_cfg: TransportConfig) -> Self {
        Self {
            http,
            transport_cfg,
        }
    }
}

#[async_trait]
impl<T> UpstreamClient for OpenAICompatibleChatClient<T>
where
    T: HttpTransport + 'static,
{
    async fn open_stream(&self, request: UpstreamRequest) -> Result<EventStream, SdkError> {
        let url = format!("{}/chat/completions", request.base_url.trim_end_matches('/'));
        let headers = merge_headers([
            default_headers_for_key(&request.api_key).as_slice(),
            request.headers.as_slice(),
        ]);
        let body = build_chat_request_body(&request);
        tracing::info!(
            "{}: open_stream vendor={} model={} messages={}",
            TRACE_PREFIX,
            request.vendor,
            request.model,
            request.messages.len()
        );

        let resp = until_aborted(&request.abort, async {
            self.http
                .post_json_stream(&url, &headers, &body, &self.transport_cfg)
                .await
                .map_err(map_transport_error_to_sdk_error)
        })
        .await?;
        let (bytes, _res_headers) = <T as HttpTransport>::into_stream(resp);

        Ok(sse_event_stream(
            bytes,
            OpenAICompatibleChatChunk::new(request.tool_call_streaming),
            request.abort.clone(),
        ))
    }
}
