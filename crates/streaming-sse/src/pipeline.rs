//! SSE byte stream to `StreamEvent` stream.

use futures_core::Stream;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::ai_sdk_core::error::{SdkError, TransportError};
use crate::ai_sdk_core::upstream::{abortable, EventStream};
use crate::ai_sdk_types::StreamEvent;
use crate::streaming_sse::{SseChunkParser, SseDecoder};
use bytes::Bytes;

/// Decode `bytes` as SSE and map each event through `parser`.
///
/// The stream ends after the parser reports its terminal frame, after the
/// first `StreamEvent::Error`, or on the first transport or parse failure.
/// Firing `abort` ends it with `SdkError::Cancelled`.
pub fn sse_event_stream<S, P>(bytes: S, parser: P, abort: CancellationToken) -> EventStream
where
    S: Stream<Item = Result<Bytes, TransportError>> + Send + 'static,
    P: SseChunkParser + 'static,
{
    let events = async_stream::try_stream! {
        let mut decoder = SseDecoder::new();
        let mut parser = parser;
        futures_util::pin_mut!(bytes);

        'body: while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(SdkError::from)?;
            for sse in decoder.push(&chunk) {
                for event in parser.parse(&sse)?.unwrap_or_default() {
                    let terminal = matches!(event, StreamEvent::Error { .. });
                    yield event;
                    if terminal {
                        return;
                    }
                }
                if parser.is_done() {
                    break 'body;
                }
            }
        }

        if !parser.is_done() {
            for sse in decoder.finish() {
                for event in parser.parse(&sse)?.unwrap_or_default() {
                    let terminal = matches!(event, StreamEvent::Error { .. });
                    yield event;
                    if terminal {
                        return;
                    }
                }
            }
        }
        for event in parser.finish()? {
            yield event;
        }
    };
    abortable(events, abort)
}
