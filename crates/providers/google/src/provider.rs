use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use crate::ai_sdk_core::transport::{merge_headers, HttpTransport, TransportConfig};
use crate::ai_sdk_core::upstream::{until_aborted, EventStream, UpstreamClient, UpstreamRequest};
use crate::ai_sdk_core::SdkError;
use crate::ai_sdk_streaming_sse::sse_event_stream;
use crate::provider_google::error::map_transport_error_to_sdk_error;
use crate::provider_google::gen_ai::prompt::{convert_to_google_prompt, GooglePrompt};
use crate::provider_google::gen_ai::stream::GoogleChunk;
use crate::provider_google::prepare_tools::prepare_tools;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const TRACE_PREFIX: &str = "[GOOGLE]";

fn default_headers_from_api_key(api_key: &str) -> Vec<(String, String)> {
    let mut h = vec![
        ("content-type".to_string(), "application/json".to_string()),
        ("accept".to_string(), "text/event-stream".to_string()),
    ];
    if !api_key.is_empty() {
        h.push(("x-goog-api-key".into(), api_key.to_string()));
    }
    h
}

fn model_path(model_id: &str) -> String {
    if model_id.contains('/') {
        model_id.to_string()
    } else {
        format!("models/{}", urlencoding::encode(model_id))
    }
}

fn is_gemma(model_id: &str) -> bool {
    model_id.to_ascii_lowercase().starts_with("gemma-")
}

pub fn stream_url(base_url: &str, model_id: &str) -> String {
    format!(
        "{}/{}:streamGenerateContent?alt=sse",
        base_url.trim_end_matches('/'),
        model_path(model_id)
    )
}

/// `streamGenerateContent` body for `request`.
pub fn build_generate_content_body(request: &UpstreamRequest) -> Result<JsonValue, SdkError> {
    let GooglePrompt {
        system_instruction,
        contents,
    } = convert_to_google_prompt(&request.messages, is_gemma(&request.model));
    let prepared = prepare_tools(&request.tools, &request.tool_choice);

    let mut body = json!({ "contents": serde_json::to_value(contents)? });
    if let Some(si) = system_instruction {
        body["systemInstruction"] = serde_json::to_value(si)?;
    }
    if let Some(tools) = prepared.tools {
        body["tools"] = tools;
    }
    if let Some(tool_config) = prepared.tool_config {
        body["toolConfig"] = tool_config;
    }
    Ok(body)
}

pub struct GoogleGenAiClient<T: HttpTransport = crate::reqwest_transport::ReqwestTransport> {
    http: T,
    transport_cfg: TransportConfig,
}

impl GoogleGenAiClient {
    pub fn new(transport_cfg: TransportConfig) -> Result<Self, SdkError> {
        let http = crate::reqwest_transport::ReqwestTransport::try_new(&transport_cfg)
            .map_err(SdkError::Transport)?;
        Ok(Self {
            http,
            transport_cfg,
        })
    }
}

impl<T: HttpTransport> GoogleGenAiClient<T> {
    pub fn with_transport(http: T, transport_cfg: TransportConfig) -> Self {
        Self {
            http,
            transport_cfg,
        }
    }
}

#[async_trait]
impl<T> UpstreamClient for GoogleGenAiClient<T>
where
    T: HttpTransport + 'static,
{
    async fn open_stream(&self, request: UpstreamRequest) -> Result<EventStream, SdkError> {
        let url = stream_url(&request.base_url, &request.model);
        let headers = merge_headers([
            default_headers_from_api_key(&request.api_key).as_slice(),
            request.headers.as_slice(),
        ]);
        let body = build_generate_content_body(&request)?;
        tracing::info!(
            "{}: open_stream model={} contents={}",
            TRACE_PREFIX,
            request.model,
            body["contents"].as_array().map_or(0, |c| c.len())
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
            GoogleChunk::new(request.tool_call_streaming),
            request.abort.clone(),
        ))
    }
}
