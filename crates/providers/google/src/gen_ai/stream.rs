use serde_json::{json, Value as JsonValue};

use crate::ai_sdk_core::SdkError;
use crate::ai_sdk_streaming_sse::{SseChunkParser, SseEvent};
use crate::ai_sdk_types::{FinishReason, StreamEvent, TokenUsage};
use crate::provider_google::error::stream_error_from_chunk;

/// `streamGenerateContent?alt=sse` chunks to `StreamEvent`s.
///
/// Gemini sends each function call whole, so a call is reported as one
/// `ToolCall` (preceded by a start and a single delta when tool-call
/// streaming is on). Ids are generated locally. The stream has no terminal
/// frame; the finish events are produced when the body ends.
pub struct GoogleChunk {
    tool_call_streaming: bool,
    usage: Option<TokenUsage>,
    finish_reason: FinishReason,
    has_tool_calls: bool,
}

impl GoogleChunk {
    pub fn new(tool_call_streaming: bool) -> Self {
        Self {
            tool_call_streaming,
            usage: None,
            finish_reason: FinishReason::Unknown,
            has_tool_calls: false,
        }
    }

    fn handle_candidate(&mut self, cand: &JsonValue, out: &mut Vec<StreamEvent>) {
        let parts = cand
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default();
        for p in parts {
            if let Some(txt) = p.get("text").and_then(|v| v.as_str()) {
                // thought summaries are not forwarded
                let is_thought = p.get("thought").and_then(|v| v.as_bool()).unwrap_or(false);
                if !txt.is_empty() && !is_thought {
                    out.push(StreamEvent::text(txt));
                }
                continue;
            }
            if let Some(fc) = p.get("functionCall").and_then(|v| v.as_object()) {
                let name = fc
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let args = fc.get("args").cloned().unwrap_or(json!({}));
                let id = uuid::Uuid::new_v4().to_string();
                if self.tool_call_streaming {
                    out.push(StreamEvent::ToolCallStreamingStart {
                        tool_call_id: id.clone(),
                        tool_name: name.clone(),
                    });
                    out.push(StreamEvent::ToolCallDelta {
                        tool_call_id: id.clone(),
                        tool_name: name.clone(),
                        args_text_delta: args.to_string(),
                    });
                }
                out.push(StreamEvent::ToolCall {
                    tool_call_id: Some(id),
                    tool_name: Some(name).filter(|n| !n.is_empty()),
                    args,
                });
                self.has_tool_calls = true;
            }
        }

        if let Some(fr) = cand.get("finishReason").and_then(|v| v.as_str()) {
            self.finish_reason = map_google_finish_reason(fr, self.has_tool_calls);
        }
    }
}

impl SseChunkParser for GoogleChunk {
    fn parse(&mut self, event: &SseEvent) -> Result<Option<Vec<StreamEvent>>, SdkError> {
        let parsed: JsonValue = match serde_json::from_slice(&event.data) {
            Ok(v) => v,
            Err(_) => return Ok(None),
        };
        if let Some(err) = stream_error_from_chunk(&parsed) {
            return Ok(Some(vec![err]));
        }

        if let Some(u) = parsed.get("usageMetadata") {
            self.usage = Some(TokenUsage {
                input_tokens: u
                    .get("promptTokenCount")
                    .and_then(|v| v.as_u64())
                    .unwrap_or_default(),
                output_tokens: u
                    .get("candidatesTokenCount")
                    .and_then(|v| v.as_u64())
                    .unwrap_or_default(),
            });
        }

        let mut out = Vec::new();
        if let Some(cands) = parsed.get("candidates").and_then(|v| v.as_array()) {
            for cand in cands {
                self.handle_candidate(cand, &mut out);
            }
        }
        Ok(Some(out))
    }

    fn finish(&mut self) -> Result<Vec<StreamEvent>, SdkError> {
        Ok(vec![
            StreamEvent::StepFinish {
                finish_reason: self.finish_reason,
            },
            StreamEvent::Finish {
                finish_reason: self.finish_reason,
                usage: self.usage,
            },
        ])
    }
}

pub fn map_google_finish_reason(reason: &str, has_tool_calls: bool) -> FinishReason {
    match reason {
        "STOP" => {
            if has_tool_calls {
                FinishReason::ToolCalls
            } else {
                FinishReason::Stop
            }
        }
        "MAX_TOKENS" => FinishReason::Length,
        "IMAGE_SAFETY" | "RECITATION" | "SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
            FinishReason::ContentFilter
        }
        "FINISH_REASON_UNSPECIFIED" | "OTHER" => FinishReason::Other,
        "MALFORMED_FUNCTION_CALL" => FinishReason::Error,
        _ => FinishReason::Unknown,
    }
}
