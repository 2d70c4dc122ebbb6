//! Scripted provider and response builders for loop tests.

use rangaayan_core::error::ProviderError;
use rangaayan_core::message::{Message, MessageToolCall};
use rangaayan_core::provider::{
    FINISH_TOOL_CALLS, Provider, ProviderRequest, ProviderResponse, Usage,
};
use std::sync::Mutex;

/// A mock provider that replays a script of responses or errors.
///
/// Each call to `complete` consumes the next entry and records the request.
/// Calls past the end of the script fail with `InvalidResponse`.
pub struct ScriptedProvider {
    script: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that answers every call from `responses` in order.
    pub fn responses(responses: Vec<ProviderResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok).collect())
    }

    /// A provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::responses(vec![make_text_response(text)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };
        let script = self.script.lock().unwrap();
        script.get(index).cloned().unwrap_or_else(|| {
            Err(ProviderError::InvalidResponse(format!(
                "script exhausted (call #{index}, have {})",
                script.len()
            )))
        })
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        usage: usage(),
        ..ProviderResponse::single(Message::assistant(text), Some("stop"), "scripted-model")
    }
}

/// Create a response that requests tool execution.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    ProviderResponse {
        usage: usage(),
        ..ProviderResponse::single(
            Message::assistant_tool_calls("", tool_calls),
            Some(FINISH_TOOL_CALLS),
            "scripted-model",
        )
    }
}

/// A response with no choices at all.
pub fn make_empty_response() -> ProviderResponse {
    ProviderResponse {
        choices: Vec::new(),
        usage: None,
        model: "scripted-model".into(),
    }
}

/// Create a tool call with raw JSON-text arguments.
pub fn make_tool_call(id: &str, name: &str, arguments: &str) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: arguments.into(),
    }
}
