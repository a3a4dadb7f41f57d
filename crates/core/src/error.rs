use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    /// No credential configured for the vendor. Raised before any network call.
    #[error("{message}")]
    Authentication { message: String },
    #[error("rate limited")]
    RateLimited {
        /// Milliseconds suggested by Retry-After if present
        retry_after_ms: Option<u64>,
        #[source]
        source: Option<Box<TransportError>>,
    },
    #[error("cancelled")]
    Cancelled,
    #[error("upstream error (status {status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        #[source]
        source: Option<Box<TransportError>>,
    },
    /// Error event reported in-band by the vendor stream.
    #[error("{message}")]
    Stream {
        message: String,
        cause: Option<Value>,
    },
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl SdkError {
    pub fn authentication(message: impl Into<String>) -> Self {
        SdkError::Authentication {
            message: message.into(),
        }
    }

    /// Caller-initiated abort, as opposed to a transport or vendor failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SdkError::Cancelled)
    }

    /// Nested cause rendered for diagnostics, if the error carries one.
    ///
    /// Vendor stream errors keep their structured cause as JSON; everything
    /// else walks the `source()` chain.
    pub fn cause_detail(&self) -> Option<String> {
        if let SdkError::Stream { cause, .. } = self {
            return cause
                .as_ref()
                .map(|c| serde_json::to_string_pretty(c).unwrap_or_else(|_| c.to_string()));
        }
        let mut parts = Vec::new();
        let mut current = self.source();
        while let Some(src) = current {
            parts.push(src.to_string());
            current = src.source();
        }
        if let Some(TransportError::HttpStatus { body, .. }) = self.transport_source() {
            if !body.is_empty() {
                parts.push(display_body_for_error(body));
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(": "))
        }
    }

    fn transport_source(&self) -> Option<&TransportError> {
        match self {
            SdkError::Upstream { source, .. } | SdkError::RateLimited { source, .. } => {
                source.as_deref()
            }
            SdkError::Transport(te) => Some(te),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http status {status}: {sanitized}")]
    HttpStatus {
        status: u16,
        /// upstream body (should be treated as sensitive; only log sanitized)
        body: String,
        /// Retry-After header (ms) if available
        retry_after_ms: Option<u64>,
        /// Sanitized message for display
        sanitized: String,
        /// Upstream response headers (lowercased keys where possible)
        headers: Vec<(String, String)>,
    },
    #[error("network: {0}")]
    Network(String),
    #[error("connect timeout after {0:?}")]
    ConnectTimeout(Duration),
    #[error("idle read timeout after {0:?}")]
    IdleReadTimeout(Duration),
    #[error("body read error: {0}")]
    BodyRead(String),
    #[error("other: {0}")]
    Other(String),
}

pub fn http_status_fallback_message(status: u16) -> String {
    format!("http status {status}")
}

pub fn build_http_status_transport_error(
    status: u16,
    body: String,
    retry_after_ms: Option<u64>,
    headers: Vec<(String, String)>,
) -> TransportError {
    TransportError::HttpStatus {
        status,
        body,
        retry_after_ms,
        sanitized: http_status_fallback_message(status),
        headers,
    }
}

/// Map a non-success HTTP response to an `SdkError`.
///
/// 429 becomes `RateLimited`; everything else `Upstream`, preferring the
/// vendor's parsed message over the bare status line.
pub fn map_http_status_to_sdk_error(
    status: u16,
    body: String,
    retry_after_ms: Option<u64>,
    headers: Vec<(String, String)>,
    message: Option<String>,
) -> SdkError {
    let source = build_http_status_transport_error(status, body, retry_after_ms, headers);
    if status == 429 {
        return SdkError::RateLimited {
            retry_after_ms,
            source: Some(Box::new(source)),
        };
    }
    SdkError::Upstream {
        status,
        message: message.unwrap_or_else(|| http_status_fallback_message(status)),
        source: Some(Box::new(source)),
    }
}

/// Minified JSON body, or just its size when the body is not JSON.
pub fn display_body_for_error(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
            return v.to_string();
        }
    }
    format!("{} bytes", body.len())
}

#[cfg(test)]
mod tests {
    use super::{map_http_status_to_sdk_error, SdkError, TransportError};
    use serde_json::json;

    #[test]
    fn upstream_helper_uses_parsed_message_when_present() {
        let mapped = map_http_status_to_sdk_error(
            418,
            "{\"error\":\"teapot\"}".into(),
            None,
            vec![("x-test".into(), "1".into())],
            Some("custom message".into()),
        );

        match mapped {
            SdkError::Upstream {
                status,
                message,
                source,
            } => {
                assert_eq!(status, 418);
                assert_eq!(message, "custom message");
                match source.as_deref() {
                    Some(TransportError::HttpStatus { sanitized, .. }) => {
                        assert_eq!(sanitized, "http status 418")
                    }
                    other => panic!("unexpected source: {other:?}"),
                }
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn status_429_maps_to_rate_limited() {
        let mapped = map_http_status_to_sdk_error(429, "slow down".into(), Some(2500), vec![], None);
        match mapped {
            SdkError::RateLimited { retry_after_ms, .. } => assert_eq!(retry_after_ms, Some(2500)),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn stream_error_cause_is_pretty_json() {
        let err = SdkError::Stream {
            message: "overloaded".into(),
            cause: Some(json!({"type":"overloaded_error"})),
        };
        assert_eq!(err.to_string(), "overloaded");
        let cause = err.cause_detail().unwrap();
        assert!(cause.contains("\"type\": \"overloaded_error\""), "{cause}");
    }

    #[test]
    fn upstream_cause_includes_transport_source_and_body() {
        let err = map_http_status_to_sdk_error(
            500,
            "{\"error\":{\"message\":\"boom\"}}".into(),
            None,
            vec![],
            Some("boom".into()),
        );
        let cause = err.cause_detail().unwrap();
        assert!(cause.starts_with("http status 500"), "{cause}");
        assert!(cause.contains("{\"error\":{\"message\":\"boom\"}}"), "{cause}");
    }

    #[test]
    fn authentication_has_no_cause() {
        let err = SdkError::authentication("No API key set.");
        assert_eq!(err.to_string(), "No API key set.");
        assert!(err.cause_detail().is_none());
        assert!(!err.is_cancellation());
        assert!(SdkError::Cancelled.is_cancellation());
    }
}
