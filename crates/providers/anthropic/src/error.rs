use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::ai_sdk_core::error::{map_http_status_to_sdk_error, SdkError, TransportError};
use crate::ai_sdk_types::StreamEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicErrorItem {
    pub r#type: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicErrorData {
    pub r#type: String, // 'error'
    pub error: AnthropicErrorItem,
}

/// Attempt to parse an Anthropic JSON error body and map to an SdkError.
pub fn map_transport_error_to_sdk_error(te: TransportError) -> SdkError {
    match te {
        TransportError::HttpStatus {
            status,
            body,
            retry_after_ms,
            headers,
            ..
        } => {
            let parsed_message = serde_json::from_str::<AnthropicErrorData>(&body)
                .ok()
                .map(|err| err.error.message);
            map_http_status_to_sdk_error(status, body, retry_after_ms, headers, parsed_message)
        }
        other => SdkError::Transport(other),
    }
}

/// In-band `error` frame (e.g. `overloaded_error`) as a terminal stream event.
pub fn stream_error_from_frame(frame: &JsonValue) -> StreamEvent {
    let error = frame.get("error").cloned();
    let message = error
        .as_ref()
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("Anthropic stream error")
        .to_string();
    StreamEvent::Error {
        message,
        cause: error,
    }
}
