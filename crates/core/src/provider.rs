//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider knows how to send a conversation (plus optional tool specs)
//! to a model and return its choices, or fail with a transport-level error.
//!
//! Implementations: OpenAI-compatible endpoints (OpenRouter by default).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;

/// A single model request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "moonshotai/kimi-k2.5")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Tools the model may call. Empty means the model must answer in text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Reasoning toggle: `Some(false)` asks for fast low-effort generation,
    /// `Some(true)` for deeper deliberation, `None` leaves the provider default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<bool>,
}

impl ProviderRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            tools: Vec::new(),
            reasoning: None,
        }
    }
}

/// A tool definition sent to the LLM so it knows what tools it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// Finish reason reported when the model stops to request tools.
pub const FINISH_TOOL_CALLS: &str = "tool_calls";

/// One candidate completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// The generated assistant message
    pub message: Message,

    /// Provider finish reason ("stop", "tool_calls", "length", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Choice {
    /// Whether the model asked for tool execution, either through the
    /// finish reason or by emitting tool calls.
    pub fn wants_tools(&self) -> bool {
        self.finish_reason.as_deref() == Some(FINISH_TOOL_CALLS) || !self.message.tool_calls.is_empty()
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Candidate completions. May be empty for degenerate responses.
    pub choices: Vec<Choice>,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

impl ProviderResponse {
    /// A single-choice response, the common case.
    pub fn single(message: Message, finish_reason: Option<&str>, model: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message,
                finish_reason: finish_reason.map(String::from),
            }],
            usage: None,
            model: model.into(),
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The orchestration loop calls `complete()` exactly once per round without
/// knowing which backend is used. Implementations must not retry internally
/// beyond what their transport does.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
