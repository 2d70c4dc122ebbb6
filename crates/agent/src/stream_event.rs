//! Loop-level streaming events.
//!
//! `LoopEvent` is what the gateway forwards to clients over SSE. The wire
//! shape is `{"type": "status" | "result" | "error", ...}`.

use serde::{Deserialize, Serialize};

/// Events emitted by a streaming orchestration run.
///
/// - `status` — progress text; any number precede the terminal event
/// - `result` — the final answer (terminal)
/// - `error`  — the run failed (terminal)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoopEvent {
    /// Human-readable progress.
    Status { message: String },

    /// Final model answer.
    Result { content: String },

    /// The run failed or could not produce an answer.
    Error { message: String },
}

impl LoopEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Result { .. } => "result",
            Self::Error { .. } => "error",
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Status { .. })
    }
}
