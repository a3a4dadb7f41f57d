use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::ai_sdk_core::error::{map_http_status_to_sdk_error, SdkError, TransportError};
use crate::ai_sdk_types::StreamEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAICompatibleInnerError {
    pub message: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub param: Option<JsonValue>,
    #[serde(default)]
    pub code: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAICompatibleErrorData {
    pub error: OpenAICompatibleInnerError,
}

/// Attempt to parse an OpenAI-compatible JSON error body and map to an SdkError.
pub fn map_transport_error_to_sdk_error(te: TransportError) -> SdkError {
    match te {
        TransportError::HttpStatus {
            status,
            body,
            retry_after_ms,
            headers,
            ..
        } => {
            // 401 bodies sometimes echo the key prefix; keep the status line only.
            let parsed_message = (status != 401)
                .then(|| serde_json::from_str::<OpenAICompatibleErrorData>(&body).ok())
                .flatten()
                .map(|err| err.error.message);
            map_http_status_to_sdk_error(status, body, retry_after_ms, headers, parsed_message)
        }
        other => SdkError::Transport(other),
    }
}

/// OpenRouter and Groq can report a failure as a `data: {"error":{...}}`
/// chunk after the 200 response has started.
pub fn stream_error_from_chunk(chunk: &JsonValue) -> Option<StreamEvent> {
    let error = chunk.get("error")?;
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .unwrap_or("upstream stream error")
        .to_string();
    Some(StreamEvent::Error {
        message,
        cause: Some(error.clone()),
    })
}
