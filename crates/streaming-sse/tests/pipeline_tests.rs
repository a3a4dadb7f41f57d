use crate::ai_sdk_core::error::{SdkError, TransportError};
use crate::ai_sdk_streaming_sse::{sse_event_stream, SseChunkParser, SseEvent};
use crate::ai_sdk_types::{FinishReason, StreamEvent};
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use tokio_util::sync::CancellationToken;

/// `done` terminates, `error` reports an in-band error, `bad` fails parsing,
/// anything else is a text delta.
#[derive(Default)]
struct LineParser {
    done: bool,
    flushed: bool,
}

impl SseChunkParser for LineParser {
    fn parse(&mut self, event: &SseEvent) -> Result<Option<Vec<StreamEvent>>, SdkError> {
        match event.data_str().as_ref() {
            "done" => {
                self.done = true;
                Ok(Some(vec![StreamEvent::Finish {
                    finish_reason: FinishReason::Stop,
                    usage: None,
                }]))
            }
            "error" => Ok(Some(vec![StreamEvent::Error {
                message: "boom".into(),
                cause: None,
            }])),
            "ping" => Ok(None),
            "bad" => Err(SdkError::InvalidArgument {
                message: "bad frame".into(),
            }),
            other => Ok(Some(vec![StreamEvent::text(other)])),
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn finish(&mut self) -> Result<Vec<StreamEvent>, SdkError> {
        if self.done || self.flushed {
            return Ok(Vec::new());
        }
        self.flushed = true;
        Ok(vec![StreamEvent::Finish {
            finish_reason: FinishReason::Unknown,
            usage: None,
        }])
    }
}

fn frames(lines: &[&str]) -> Vec<Result<Bytes, TransportError>> {
    lines
        .iter()
        .map(|line| Ok(Bytes::from(format!("data: {line}\n\n"))))
        .collect()
}

async fn collect(
    chunks: Vec<Result<Bytes, TransportError>>,
) -> Vec<Result<StreamEvent, SdkError>> {
    sse_event_stream(stream::iter(chunks), LineParser::default(), CancellationToken::new())
        .collect()
        .await
}

#[tokio::test]
async fn terminal_frame_stops_reading() {
    let events = collect(frames(&["a", "ping", "b", "done", "ignored"])).await;
    let events: Vec<_> = events.into_iter().map(Result::unwrap).collect();
    assert_eq!(
        events,
        vec![
            StreamEvent::text("a"),
            StreamEvent::text("b"),
            StreamEvent::Finish {
                finish_reason: FinishReason::Stop,
                usage: None
            },
        ]
    );
}

#[tokio::test]
async fn error_event_is_last() {
    let events = collect(frames(&["a", "error", "b"])).await;
    assert_eq!(events.len(), 2);
    assert!(matches!(events[1], Ok(StreamEvent::Error { .. })));
}

#[tokio::test]
async fn eof_without_terminal_frame_flushes_parser() {
    let chunks = vec![Ok(Bytes::from("data: tail"))];
    let events: Vec<_> = collect(chunks).await.into_iter().map(Result::unwrap).collect();
    assert_eq!(
        events,
        vec![
            StreamEvent::text("tail"),
            StreamEvent::Finish {
                finish_reason: FinishReason::Unknown,
                usage: None
            },
        ]
    );
}

#[tokio::test]
async fn transport_failure_surfaces_as_error() {
    let mut chunks = frames(&["a"]);
    chunks.push(Err(TransportError::BodyRead("connection reset".into())));
    chunks.extend(frames(&["b"]));
    let events = collect(chunks).await;
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[1],
        Err(SdkError::Transport(TransportError::BodyRead(_)))
    ));
}

#[tokio::test]
async fn parse_failure_surfaces_as_error() {
    let events = collect(frames(&["bad", "a"])).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Err(SdkError::InvalidArgument { .. })));
}

#[tokio::test]
async fn frames_split_across_chunks() {
    let chunks = vec![
        Ok(Bytes::from("data: hel")),
        Ok(Bytes::from("lo\n")),
        Ok(Bytes::from("\ndata: done\n\n")),
    ];
    let events: Vec<_> = collect(chunks).await.into_iter().map(Result::unwrap).collect();
    assert_eq!(events[0], StreamEvent::text("hello"));
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn abort_ends_stream_with_cancelled() {
    let token = CancellationToken::new();
    let bytes = stream::iter(frames(&["a"])).chain(stream::pending());
    let mut events = sse_event_stream(bytes, LineParser::default(), token.clone());
    assert_eq!(events.next().await.unwrap().unwrap(), StreamEvent::text("a"));
    token.cancel();
    assert!(matches!(events.next().await, Some(Err(SdkError::Cancelled))));
    assert!(events.next().await.is_none());
}
