//! Injected logging capability.
//!
//! Adapters never log through a process-wide singleton; each one receives an
//! `Arc<dyn Logger>` at construction. `TracingLogger` is the production sink
//! and `MemoryLogger` captures lines for assertions.

use std::sync::Mutex;

use serde_json::Value;

use crate::ai_sdk_types::{ToolChoice, ToolSet};

pub const LOG_TARGET: &str = "copilot_boost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Log,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Log => "LOG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Output-channel line format: `[LEVEL] message`.
pub fn format_line(level: LogLevel, message: &str) -> String {
    format!("[{}] {}", level.label(), message)
}

pub trait Logger: Send + Sync {
    fn write(&self, level: LogLevel, message: &str);

    fn log(&self, message: &str) {
        self.write(LogLevel::Log, message);
    }

    fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }
}

/// Forwards to `tracing`. `LOG` lines are emitted at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn write(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Log => tracing::debug!(target: LOG_TARGET, "{}", message),
            LogLevel::Info => tracing::info!(target: LOG_TARGET, "{}", message),
            LogLevel::Warn => tracing::warn!(target: LOG_TARGET, "{}", message),
            LogLevel::Error => tracing::error!(target: LOG_TARGET, "{}", message),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Rendered output-channel lines.
    pub fn rendered(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|(level, msg)| format_line(level, &msg))
            .collect()
    }

    pub fn count_containing(&self, level: LogLevel, needle: &str) -> usize {
        self.lines()
            .iter()
            .filter(|(l, msg)| *l == level && msg.contains(needle))
            .count()
    }
}

impl Logger for MemoryLogger {
    fn write(&self, level: LogLevel, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }
}

/// Log the effective request configuration before the stream is opened.
pub fn log_tool_configuration(
    logger: &dyn Logger,
    vendor: &str,
    has_tools: bool,
    tools: &ToolSet,
    model: &str,
    tool_choice: Option<ToolChoice>,
    extra: &[(&str, Value)],
) {
    let choice = tool_choice.map(|c| c.as_str()).unwrap_or("undefined");
    let mut line = format!("[{vendor}] stream config: modelName={model}, toolChoice={choice}");
    for (k, v) in extra {
        line.push_str(&format!(", {k}={v}"));
    }
    logger.log(&line);
    logger.log(&format!(
        "[{vendor}] Tools available: {has_tools}, tool count: {}",
        tools.len()
    ));
    if has_tools {
        logger.log(&format!(
            "[{vendor}] Tool names: {}",
            tools.names().collect::<Vec<_>>().join(", ")
        ));
    }
}
