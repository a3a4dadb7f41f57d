use crate::ai_sdk_core::error::{map_http_status_to_sdk_error, SdkError, TransportError};
use crate::ai_sdk_types::StreamEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleErrorInner {
    pub code: Option<i64>,
    pub message: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleErrorData {
    pub error: GoogleErrorInner,
}

/// Attempt to parse a Google-family JSON error body and map to SdkError.
///
/// `streamGenerateContent` wraps the error object in a one-element array.
pub fn map_transport_error_to_sdk_error(te: TransportError) -> SdkError {
    match te {
        TransportError::HttpStatus {
            status,
            body,
            retry_after_ms,
            headers,
            ..
        } => {
            let parsed_message = serde_json::from_str::<GoogleErrorData>(&body)
                .ok()
                .or_else(|| {
                    serde_json::from_str::<Vec<GoogleErrorData>>(&body)
                        .ok()
                        .and_then(|mut all| all.pop())
                })
                .map(|parsed| parsed.error.message);
            map_http_status_to_sdk_error(status, body, retry_after_ms, headers, parsed_message)
        }
        other => SdkError::Transport(other),
    }
}

/// `{"error": {...}}` delivered as an SSE data frame.
pub fn stream_error_from_chunk(chunk: &JsonValue) -> Option<StreamEvent> {
    let error = chunk.get("error")?;
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Gemini stream error")
        .to_string();
    Some(StreamEvent::Error {
        message,
        cause: Some(error.clone()),
    })
}
