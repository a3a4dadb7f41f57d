use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::ai_sdk_core::error::SdkError;
use crate::ai_sdk_streaming_sse::{SseChunkParser, SseEvent};
use crate::ai_sdk_types::json::tool_arguments_value;
use crate::ai_sdk_types::{FinishReason, StreamEvent, TokenUsage};
use crate::provider_anthropic::error::stream_error_from_frame;

const TRACE_PREFIX: &str = "[ANTHROPIC]";

struct ToolUseBlock {
    id: String,
    name: String,
    args: String,
}

/// Messages API SSE frames to `StreamEvent`s.
///
/// Tool input arrives as `input_json_delta` fragments per content block and
/// is emitted as one complete `ToolCall` on `content_block_stop`.
pub struct AnthropicChunk {
    tool_call_streaming: bool,
    tool_blocks: HashMap<u64, ToolUseBlock>,
    usage: TokenUsage,
    finish_reason: FinishReason,
    done: bool,
}

impl AnthropicChunk {
    pub fn new(tool_call_streaming: bool) -> Self {
        Self {
            tool_call_streaming,
            tool_blocks: HashMap::new(),
            usage: TokenUsage::default(),
            finish_reason: FinishReason::Unknown,
            done: false,
        }
    }

    fn parse_frame(&mut self, v: &JsonValue) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        let index = v.get("index").and_then(|i| i.as_u64());
        match v.get("type").and_then(|t| t.as_str()).unwrap_or_default() {
            "message_start" => {
                if let Some(usage) = v.get("message").and_then(|m| m.get("usage")) {
                    self.record_usage(usage);
                }
            }
            "content_block_start" => {
                let block = v.get("content_block");
                let is_tool = block.and_then(|b| b.get("type")).and_then(|t| t.as_str())
                    == Some("tool_use");
                if let (true, Some(idx), Some(block)) = (is_tool, index, block) {
                    let id = str_field(block, "id");
                    let name = str_field(block, "name");
                    if self.tool_call_streaming {
                        out.push(StreamEvent::ToolCallStreamingStart {
                            tool_call_id: id.clone(),
                            tool_name: name.clone(),
                        });
                    }
                    self.tool_blocks.insert(
                        idx,
                        ToolUseBlock {
                            id,
                            name,
                            args: String::new(),
                        },
                    );
                }
            }
            "content_block_delta" => {
                let delta = v.get("delta");
                match delta.and_then(|d| d.get("type")).and_then(|t| t.as_str()) {
                    Some("text_delta") => {
                        let text = delta.and_then(|d| d.get("text")).and_then(|t| t.as_str());
                        if let Some(text) = text.filter(|t| !t.is_empty()) {
                            out.push(StreamEvent::text(text));
                        }
                    }
                    Some("input_json_delta") => {
                        let fragment = delta
                            .and_then(|d| d.get("partial_json"))
                            .and_then(|s| s.as_str())
                            .unwrap_or_default();
                        let block = index.and_then(|idx| self.tool_blocks.get_mut(&idx));
                        if let Some(block) = block {
                            block.args.push_str(fragment);
                            if self.tool_call_streaming && !fragment.is_empty() {
                                out.push(StreamEvent::ToolCallDelta {
                                    tool_call_id: block.id.clone(),
                                    tool_name: block.name.clone(),
                                    args_text_delta: fragment.to_string(),
                                });
                            }
                        }
                    }
                    // thinking and signature deltas are not surfaced
                    _ => {}
                }
            }
            "content_block_stop" => {
                if let Some(block) = index.and_then(|idx| self.tool_blocks.remove(&idx)) {
                    out.push(complete_tool_call(block));
                }
            }
            "message_delta" => {
                if let Some(reason) = v
                    .get("delta")
                    .and_then(|d| d.get("stop_reason"))
                    .and_then(|r| r.as_str())
                {
                    self.finish_reason = map_anthropic_stop_reason(reason);
                }
                if let Some(usage) = v.get("usage") {
                    self.record_usage(usage);
                }
            }
            "message_stop" => {
                out.extend(self.drain_tool_blocks());
                out.push(StreamEvent::StepFinish {
                    finish_reason: self.finish_reason,
                });
                out.push(StreamEvent::Finish {
                    finish_reason: self.finish_reason,
                    usage: Some(self.usage),
                });
                self.done = true;
            }
            "error" => out.push(stream_error_from_frame(v)),
            _ => {}
        }
        out
    }

    fn record_usage(&mut self, usage: &JsonValue) {
        if let Some(input) = usage.get("input_tokens").and_then(|v| v.as_u64()) {
            self.usage.input_tokens = input;
        }
        if let Some(output) = usage.get("output_tokens").and_then(|v| v.as_u64()) {
            self.usage.output_tokens = output;
        }
    }

    /// Blocks still open when the message ends, in index order.
    fn drain_tool_blocks(&mut self) -> Vec<StreamEvent> {
        let mut blocks: Vec<_> = self.tool_blocks.drain().collect();
        blocks.sort_by_key(|(idx, _)| *idx);
        blocks
            .into_iter()
            .map(|(_, block)| complete_tool_call(block))
            .collect()
    }
}

impl SseChunkParser for AnthropicChunk {
    fn parse(&mut self, event: &SseEvent) -> Result<Option<Vec<StreamEvent>>, SdkError> {
        if event.event.as_deref() == Some("ping") {
            return Ok(None);
        }
        // Non-JSON payloads are heartbeats.
        let v: JsonValue = match serde_json::from_slice(&event.data) {
            Ok(v) => v,
            Err(_) => return Ok(None),
        };
        Ok(Some(self.parse_frame(&v)))
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn finish(&mut self) -> Result<Vec<StreamEvent>, SdkError> {
        if self.done {
            return Ok(Vec::new());
        }
        tracing::debug!("{}: stream ended before message_stop", TRACE_PREFIX);
        Ok(vec![StreamEvent::Error {
            message: "Unexpected EOF".into(),
            cause: None,
        }])
    }
}

fn complete_tool_call(block: ToolUseBlock) -> StreamEvent {
    StreamEvent::ToolCall {
        tool_call_id: Some(block.id).filter(|id| !id.is_empty()),
        tool_name: Some(block.name).filter(|name| !name.is_empty()),
        args: tool_arguments_value(&block.args),
    }
}

fn str_field(v: &JsonValue, key: &str) -> String {
    v.get(key)
        .and_then(|s| s.as_str())
        .unwrap_or_default()
        .to_string()
}

pub fn map_anthropic_stop_reason(reason: &str) -> FinishReason {
    match reason {
        "end_turn" | "stop_sequence" | "pause_turn" => FinishReason::Stop,
        "max_tokens" => FinishReason::Length,
        "tool_use" => FinishReason::ToolCalls,
        "refusal" => FinishReason::ContentFilter,
        _ => FinishReason::Unknown,
    }
}
