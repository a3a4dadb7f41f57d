use async_trait::async_trait;

use crate::ai_sdk_core::error::SdkError;
use crate::ai_sdk_core::transport::{merge_headers, HttpTransport, TransportConfig};
use crate::ai_sdk_core::upstream::{until_aborted, EventStream, UpstreamClient, UpstreamRequest};
use crate::ai_sdk_streaming_sse::sse_event_stream;
use crate::provider_anthropic::error::map_transport_error_to_sdk_error;
use crate::provider_anthropic::messages::convert::build_messages_request;
use crate::provider_anthropic::messages::stream::AnthropicChunk;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
/// Client identity sent on every Anthropic request.
pub const CLAUDE_CLI_USER_AGENT: &str = "claude-cli/1.0.24 (external, sdk-cli)";
pub const CLAUDE_CODE_BETAS: &str = "claude-code-20250219,oauth-2025-04-20,interleaved-thinking-2025-05-14,fine-grained-tool-streaming-2025-05-14";
/// Claude Code OAuth access tokens start with this prefix.
pub const OAUTH_KEY_PREFIX: &str = "sk-ant-oat";

const TRACE_PREFIX: &str = "[ANTHROPIC]";

pub fn default_headers_for_key(api_key: &str) -> Vec<(String, String)> {
    let mut h = vec![
        ("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string()),
        ("content-type".to_string(), "application/json".to_string()),
        ("accept".to_string(), "text/event-stream".to_string()),
    ];
    if api_key.starts_with(OAUTH_KEY_PREFIX) {
        h.push(("authorization".into(), format!("Bearer {api_key}")));
    } else {
        h.push(("x-api-key".into(), api_key.to_string()));
    }
    h
}

/// Streaming client for `POST {base}/v1/messages`.
pub struct AnthropicMessagesClient<T: HttpTransport = crate::reqwest_transport::ReqwestTransport> {
    http: T,
    transport_cfg: TransportConfig,
}

impl AnthropicMessagesClient {
    pub fn new(transport_cfg: TransportConfig) -> Result<Self, SdkError> {
        let http = crate::reqwest_transport::ReqwestTransport::try_new(&transport_cfg)
            .map_err(SdkError::Transport)?;
        Ok(Self {
            http,
            transport_cfg,
        })
    }
}

impl<T: HttpTransport> AnthropicMessagesClient<T> {
    pub fn with_transport(http: T, transport_cfg: TransportConfig) -> Self {
        Self {
            http,
            transport_cfg,
        }
    }
}

#[async_trait]
impl<T> UpstreamClient for AnthropicMessagesClient<T>
where
    T: HttpTransport + 'static,
{
    async fn open_stream(&self, request: UpstreamRequest) -> Result<EventStream, SdkError> {
        let url = format!("{}/v1/messages", request.base_url.trim_end_matches('/'));
        let headers = merge_headers([
            default_headers_for_key(&request.api_key).as_slice(),
            request.headers.as_slice(),
        ]);
        let body = serde_json::to_value(build_messages_request(&request))?;
        tracing::info!(
            "{}: open_stream model={} messages={} tools={}",
            TRACE_PREFIX,
            request.model,
            request.messages.len(),
            request.tools.as_ref().map_or(0, |t| t.len())
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
            AnthropicChunk::new(request.tool_call_streaming),
            request.abort.clone(),
        ))
    }
}
