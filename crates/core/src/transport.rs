use crate::core::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;
use serde_json::Value;
use std::pin::Pin;
use std::time::Duration;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Overall request timeout (optional; if None, rely on connect + idle)
    pub request_timeout: Option<Duration>,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Per-chunk idle read timeout
    pub idle_read_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: None,
            connect_timeout: Duration::from_secs(10),
            idle_read_timeout: Duration::from_secs(45),
        }
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Response for a successful streaming HTTP request.
    type StreamResponse: Send;

    /// Split the transport-specific response into its body stream and headers.
    fn into_stream(resp: Self::StreamResponse) -> (ByteStream, Vec<(String, String)>);

    /// POST a JSON body and return the streaming response. Non-success
    /// statuses are reported as `TransportError::HttpStatus` with the body read.
    async fn post_json_stream(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        cfg: &TransportConfig,
    ) -> Result<Self::StreamResponse, TransportError>;
}

/// Merge header lists case-insensitively; later entries win and keep their
/// original spelling. Output is ordered by lowercase name.
pub fn merge_headers<'a, I>(layers: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = &'a [(String, String)]>,
{
    let mut merged: std::collections::BTreeMap<String, (String, String)> = Default::default();
    for layer in layers {
        for (k, v) in layer {
            merged.insert(k.to_ascii_lowercase(), (k.clone(), v.clone()));
        }
    }
    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::merge_headers;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn later_layers_override_case_insensitively() {
        let defaults = pairs(&[("user-agent", "default"), ("accept", "text/event-stream")]);
        let vendor = pairs(&[("User-Agent", "claude-cli/1.0.24 (external, sdk-cli)")]);
        let merged = merge_headers([defaults.as_slice(), vendor.as_slice()]);
        assert_eq!(
            merged,
            pairs(&[
                ("accept", "text/event-stream"),
                ("User-Agent", "claude-cli/1.0.24 (external, sdk-cli)"),
            ])
        );
    }
}
