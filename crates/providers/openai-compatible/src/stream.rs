use serde_json::Value as JsonValue;

use crate::ai_sdk_core::SdkError;
use crate::ai_sdk_streaming_sse::{SseChunkParser, SseEvent};
use crate::ai_sdk_types::json::{parse_json_loose, tool_arguments_value};
use crate::ai_sdk_types::{FinishReason, StreamEvent, TokenUsage};
use crate::provider_openai_compatible::error::stream_error_from_chunk;

const TRACE_PREFIX: &str = "[OPENAI-COMP-CHAT]";
/// Upper bound on parallel tool calls tracked per response.
const MAX_TOOL_CALLS: usize = 128;

#[derive(Default)]
struct ToolCallState {
    id: Option<String>,
    name: Option<String>,
    args: String,
    finished: bool,
    started: bool,
}

impl ToolCallState {
    fn complete(&mut self) -> StreamEvent {
        self.finished = true;
        StreamEvent::ToolCall {
            tool_call_id: self.id.clone(),
            tool_name: self.name.clone(),
            args: tool_arguments_value(&self.args),
        }
    }
}

/// Chat Completions SSE chunks to `StreamEvent`s.
///
/// Tool call fragments are accumulated per `index`. A call is complete as
/// soon as its accumulated arguments parse as JSON; calls still open at
/// `[DONE]` are flushed with whatever arrived.
pub struct OpenAICompatibleChatChunk {
    tool_call_streaming: bool,
    tool_calls: Vec<ToolCallState>,
    usage: Option<TokenUsage>,
    finish_reason: FinishReason,
    done: bool,
}

impl OpenAICompatibleChatChunk {
    pub fn new(tool_call_streaming: bool) -> Self {
        Self {
            tool_call_streaming,
            tool_calls: Vec::new(),
            usage: None,
            finish_reason: FinishReason::Unknown,
            done: false,
        }
    }

    fn emit_finish(&mut self) -> Vec<StreamEvent> {
        let mut parts: Vec<StreamEvent> = self
            .tool_calls
            .iter_mut()
            .filter(|tc| tc.started && !tc.finished)
            .map(ToolCallState::complete)
            .collect();
        parts.push(StreamEvent::StepFinish {
            finish_reason: self.finish_reason,
        });
        parts.push(StreamEvent::Finish {
            finish_reason: self.finish_reason,
            usage: self.usage,
        });
        self.done = true;
        parts
    }

    fn handle_chat_delta(&mut self, val: &JsonValue) -> Result<Vec<StreamEvent>, ToolDeltaError> {
        let mut parts = Vec::new();
        let Some(choice0) = val
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|a| a.first())
        else {
            return Ok(parts);
        };

        if let Some(fr) = choice0.get("finish_reason").and_then(|v| v.as_str()) {
            self.finish_reason = map_openai_compatible_finish_reason(Some(fr));
        }

        let Some(delta) = choice0.get("delta").and_then(|d| d.as_object()) else {
            return Ok(parts);
        };

        if let Some(text) = delta.get("content").and_then(|v| v.as_str()) {
            if !text.is_empty() {
                parts.push(StreamEvent::text(text));
            }
        }

        let Some(tc_arr) = delta.get("tool_calls").and_then(|v| v.as_array()) else {
            return Ok(parts);
        };
        for tc in tc_arr {
            let index = tc
                .get("index")
                .and_then(|v| v.as_u64())
                .ok_or_else(|| ToolDeltaError::new("Expected 'index' to be a number."))?;
            let index = usize::try_from(index)
                .ok()
                .filter(|i| *i < MAX_TOOL_CALLS)
                .ok_or_else(|| ToolDeltaError::new("tool call index out of range"))?;
            if self.tool_calls.len() <= index {
                self.tool_calls
                    .resize_with(index + 1, ToolCallState::default);
            }
            let slot = &mut self.tool_calls[index];
            let func = tc.get("function").and_then(|v| v.as_object());
            let args_fragment = func
                .and_then(|f| f.get("arguments"))
                .and_then(|v| v.as_str())
                .unwrap_or("");

            if !slot.started {
                slot.started = true;
                // Some gateways leak calls without id or name; they surface as
                // incomplete tool calls.
                slot.id = tc.get("id").and_then(|v| v.as_str()).map(str::to_string);
                slot.name = func
                    .and_then(|f| f.get("name"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                if self.tool_call_streaming {
                    if let (Some(id), Some(name)) = (&slot.id, &slot.name) {
                        parts.push(StreamEvent::ToolCallStreamingStart {
                            tool_call_id: id.clone(),
                            tool_name: name.clone(),
                        });
                    }
                }
            }
            if slot.finished {
                continue;
            }

            slot.args.push_str(args_fragment);
            if self.tool_call_streaming && !args_fragment.is_empty() {
                if let (Some(id), Some(name)) = (&slot.id, &slot.name) {
                    parts.push(StreamEvent::ToolCallDelta {
                        tool_call_id: id.clone(),
                        tool_name: name.clone(),
                        args_text_delta: args_fragment.to_string(),
                    });
                }
            }
            if !slot.args.is_empty() && parse_json_loose(&slot.args).is_some() {
                parts.push(slot.complete());
            }
        }

        Ok(parts)
    }
}

impl SseChunkParser for OpenAICompatibleChatChunk {
    fn parse(&mut self, event: &SseEvent) -> Result<Option<Vec<StreamEvent>>, SdkError> {
        if event.data.as_ref() == b"[DONE]" {
            return Ok(Some(self.emit_finish()));
        }
        let val: JsonValue = match serde_json::from_slice(&event.data) {
            Ok(v) => v,
            Err(_) => {
                // OpenRouter sends `: OPENROUTER PROCESSING` comments, but some
                // proxies forward them as data lines.
                tracing::debug!("{}: skipping non-JSON chunk", TRACE_PREFIX);
                return Ok(None);
            }
        };
        if let Some(err) = stream_error_from_chunk(&val) {
            return Ok(Some(vec![err]));
        }

        if let Some(u) = val.get("usage").filter(|u| !u.is_null()) {
            let usage = self.usage.get_or_insert_with(TokenUsage::default);
            if let Some(input) = u.get("prompt_tokens").and_then(|v| v.as_u64()) {
                usage.input_tokens = input;
            }
            if let Some(output) = u.get("completion_tokens").and_then(|v| v.as_u64()) {
                usage.output_tokens = output;
            }
        }

        match self.handle_chat_delta(&val) {
            Ok(parts) => Ok(Some(parts)),
            Err(err) => Ok(Some(vec![err.into_event()])),
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn finish(&mut self) -> Result<Vec<StreamEvent>, SdkError> {
        if self.done {
            return Ok(Vec::new());
        }
        // Servers that close without `[DONE]` still produced a full answer.
        Ok(self.emit_finish())
    }
}

pub fn map_openai_compatible_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason.unwrap_or("") {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        "function_call" | "tool_calls" => FinishReason::ToolCalls,
        _ => FinishReason::Unknown,
    }
}

struct ToolDeltaError {
    message: String,
}

impl ToolDeltaError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn into_event(self) -> StreamEvent {
        StreamEvent::Error {
            message: self.message,
            cause: None,
        }
    }
}
