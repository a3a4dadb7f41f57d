//! Boundary between the stream adapter and a vendor wire dialect.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::ai_sdk_types::{StreamEvent, ToolChoice, ToolSet, TranslatedMessage};
use crate::core::error::SdkError;

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, SdkError>> + Send>>;

/// One streaming generation request, already translated and normalized.
#[derive(Clone)]
pub struct UpstreamRequest {
    /// Log prefix of the vendor issuing the request (e.g. "Anthropic").
    pub vendor: String,
    pub model: String,
    pub messages: Vec<TranslatedMessage>,
    /// `None` whenever no tool survived normalization.
    pub tools: Option<ToolSet>,
    /// `None` whenever `tools` is `None`.
    pub tool_choice: Option<ToolChoice>,
    pub api_key: String,
    pub base_url: String,
    pub headers: Vec<(String, String)>,
    pub tool_call_streaming: bool,
    /// Fires when the caller cancels; the dialect aborts the transport.
    pub abort: CancellationToken,
}

impl fmt::Debug for UpstreamRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamRequest")
            .field("vendor", &self.vendor)
            .field("model", &self.model)
            .field("messages", &self.messages.len())
            .field("tools", &self.tools.as_ref().map(|t| t.len()))
            .field("tool_choice", &self.tool_choice)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("tool_call_streaming", &self.tool_call_streaming)
            .finish()
    }
}

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Open the vendor stream. Errors here happen before any event.
    async fn open_stream(&self, request: UpstreamRequest) -> Result<EventStream, SdkError>;
}

/// Await `fut` unless `abort` fires first.
pub async fn until_aborted<T, F>(abort: &CancellationToken, fut: F) -> Result<T, SdkError>
where
    F: Future<Output = Result<T, SdkError>>,
{
    tokio::select! {
        biased;
        _ = abort.cancelled() => Err(SdkError::Cancelled),
        res = fut => res,
    }
}

/// End `stream` with `SdkError::Cancelled` as soon as `abort` fires.
pub fn abortable<S>(stream: S, abort: CancellationToken) -> EventStream
where
    S: Stream<Item = Result<StreamEvent, SdkError>> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        futures_util::pin_mut!(stream);
        loop {
            let next = tokio::select! {
                biased;
                _ = abort.cancelled() => Some(Err(SdkError::Cancelled)),
                item = stream.next() => item,
            };
            match next {
                Some(Err(SdkError::Cancelled)) => {
                    yield Err(SdkError::Cancelled);
                    break;
                }
                Some(item) => yield item,
                None => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[tokio::test]
    async fn abortable_passes_events_through() {
        let token = CancellationToken::new();
        let events: Vec<_> = abortable(
            stream::iter(vec![Ok(StreamEvent::text("a")), Ok(StreamEvent::text("b"))]),
            token,
        )
        .collect()
        .await;
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn abortable_stops_when_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let events: Vec<_> = abortable(stream::pending(), token).collect().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(SdkError::Cancelled)));
    }

    #[tokio::test]
    async fn until_aborted_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        let res: Result<(), SdkError> =
            until_aborted(&token, std::future::pending::<Result<(), SdkError>>()).await;
        assert!(matches!(res, Err(SdkError::Cancelled)));
    }
}
