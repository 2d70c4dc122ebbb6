//! The tool-calling orchestration loop.
//!
//! A run sends the conversation to the model, executes any tools it asks
//! for, feeds the results back, and repeats until the model answers in
//! plain text or the iteration bound is reached. On the last round tools
//! are withheld so the model has to answer.
//!
//! `run` returns the outcome directly; `run_stream` drives the same control
//! flow on a spawned task and reports progress over a channel.

use rangaayan_config::AgentConfig;
use rangaayan_core::error::ProviderError;
use rangaayan_core::message::{Conversation, Message, MessageToolCall};
use rangaayan_core::provider::{Provider, ProviderRequest, ToolDefinition};
use rangaayan_core::tool::{ToolCall, ToolRegistry};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::stream_event::LoopEvent;

pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Rendered text for a run that ran out of iterations.
pub const INCOMPLETE_MESSAGE: &str =
    "I couldn't complete the analysis within the allowed number of steps. Please try again.";

const START_STATUS: &str = "Analyzing your request...";
const FINAL_ROUND_STATUS: &str = "Preparing final answer...";

/// Channel capacity for streaming runs.
const STREAM_BUFFER: usize = 32;

/// How a run ended when no error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model's final text. May be empty; callers decide what that means.
    Answer(String),

    /// The iteration bound was reached without a text answer.
    Incomplete { rounds: usize },
}

impl LoopOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Answer(_))
    }

    /// The answer text, or the fixed "could not complete" sentence.
    pub fn into_text(self) -> String {
        match self {
            Self::Answer(text) => text,
            Self::Incomplete { .. } => INCOMPLETE_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LoopError {
    #[error("Model request failed: {source}")]
    Provider { round: usize, source: ProviderError },

    #[error("Model returned no choices (round {round})")]
    EmptyResponse { round: usize },

    #[error("Model returned an empty answer")]
    EmptyContent,

    #[error("Client disconnected")]
    Cancelled,
}

/// The orchestration loop. Cheap to clone; one value can serve many runs.
#[derive(Clone)]
pub struct ToolLoop {
    provider: Arc<dyn Provider>,
    model: String,
    max_iterations: usize,
    max_tokens: Option<u32>,
    reasoning: Option<bool>,
}

impl ToolLoop {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_tokens: None,
            reasoning: None,
        }
    }

    /// A loop configured from the `[agent]` config section.
    pub fn from_config(provider: Arc<dyn Provider>, model: impl Into<String>, config: &AgentConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            max_tokens: config.max_tokens,
            reasoning: config.reasoning,
            ..Self::new(provider, model)
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_reasoning(mut self, enabled: bool) -> Self {
        self.reasoning = Some(enabled);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Run to completion, appending every model and tool message to
    /// `conversation`.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
        tool_specs: &[ToolDefinition],
        registry: &ToolRegistry,
    ) -> Result<LoopOutcome, LoopError> {
        info!(
            model = %self.model,
            max_iterations = self.max_iterations,
            tools = tool_specs.len(),
            "Starting tool-calling run"
        );
        self.drive(conversation, tool_specs, registry, None).await
    }

    /// Run with every tool in `registry` offered to the model.
    pub async fn run_with_registry(
        &self,
        conversation: &mut Conversation,
        registry: &ToolRegistry,
    ) -> Result<LoopOutcome, LoopError> {
        let specs = registry.definitions();
        self.run(conversation, &specs, registry).await
    }

    /// Run on a spawned task, reporting progress as `LoopEvent`s.
    ///
    /// Zero or more `status` events are followed by exactly one `result` or
    /// `error`, after which the channel closes. Dropping the receiver stops
    /// the run at its next send or before its next model request.
    pub fn run_stream(
        &self,
        mut conversation: Conversation,
        tool_specs: Vec<ToolDefinition>,
        registry: ToolRegistry,
    ) -> mpsc::Receiver<LoopEvent> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let runner = self.clone();

        tokio::spawn(async move {
            info!(
                model = %runner.model,
                max_iterations = runner.max_iterations,
                tools = tool_specs.len(),
                "Starting streaming tool-calling run"
            );
            let outcome = runner
                .drive(&mut conversation, &tool_specs, &registry, Some(&tx))
                .await;

            let terminal = match outcome {
                Ok(LoopOutcome::Answer(text)) if !text.trim().is_empty() => {
                    LoopEvent::Result { content: text }
                }
                Ok(LoopOutcome::Answer(_)) => LoopEvent::Error {
                    message: LoopError::EmptyContent.to_string(),
                },
                Ok(outcome @ LoopOutcome::Incomplete { .. }) => LoopEvent::Error {
                    message: outcome.into_text(),
                },
                Err(LoopError::Cancelled) => {
                    debug!("Stream receiver dropped; run stopped");
                    return;
                }
                Err(e) => LoopEvent::Error {
                    message: e.to_string(),
                },
            };

            if tx.send(terminal).await.is_err() {
                debug!("Stream receiver dropped before terminal event");
            }
        });

        rx
    }

    async fn drive(
        &self,
        conversation: &mut Conversation,
        tool_specs: &[ToolDefinition],
        registry: &ToolRegistry,
        events: Option<&mpsc::Sender<LoopEvent>>,
    ) -> Result<LoopOutcome, LoopError> {
        emit(events, LoopEvent::status(START_STATUS)).await?;

        for round in 0..self.max_iterations {
            let last = round + 1 == self.max_iterations;

            if events.is_some_and(|tx| tx.is_closed()) {
                return Err(LoopError::Cancelled);
            }
            if last && round > 0 {
                emit(events, LoopEvent::status(FINAL_ROUND_STATUS)).await?;
            }

            let request = ProviderRequest {
                max_tokens: self.max_tokens,
                reasoning: self.reasoning,
                tools: if last { Vec::new() } else { tool_specs.to_vec() },
                ..ProviderRequest::new(&self.model, conversation.messages.clone())
            };

            debug!(round, last, messages = request.messages.len(), "Model request");

            let response = self.provider.complete(request).await.map_err(|source| {
                warn!(round, provider = self.provider.name(), error = %source, "Model request failed");
                LoopError::Provider { round, source }
            })?;

            let Some(choice) = response.choices.into_iter().next() else {
                warn!(round, "Model returned no choices");
                return Err(LoopError::EmptyResponse { round });
            };

            if choice.wants_tools() && !last {
                let calls = choice.message.tool_calls.clone();
                debug!(round, count = calls.len(), "Model requested tools");
                conversation.push(choice.message);

                for call in &calls {
                    let arguments = parse_arguments(&call.arguments);
                    let label = match (&arguments, registry.get(&call.name)) {
                        (Ok(args), Some(tool)) => tool.status_message(args),
                        _ => format!("Running {}...", call.name),
                    };
                    emit(events, LoopEvent::status(label)).await?;

                    let content = dispatch(call, arguments, registry).await;
                    conversation.push(Message::tool_result(&call.id, content));
                }
                continue;
            }

            if last && choice.wants_tools() && choice.message.content.is_empty() {
                warn!(round, "Model requested tools on the final round");
                break;
            }

            let text = choice.message.text();
            conversation.push(choice.message);
            info!(rounds = round + 1, chars = text.len(), "Run finished");
            return Ok(LoopOutcome::Answer(text));
        }

        warn!(max_iterations = self.max_iterations, "Iteration bound reached without an answer");
        Ok(LoopOutcome::Incomplete {
            rounds: self.max_iterations,
        })
    }
}

async fn emit(events: Option<&mpsc::Sender<LoopEvent>>, event: LoopEvent) -> Result<(), LoopError> {
    match events {
        Some(tx) => tx.send(event).await.map_err(|_| LoopError::Cancelled),
        None => Ok(()),
    }
}

/// Tool arguments arrive as JSON text. Blank text means no arguments.
fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}

/// Execute one tool call, folding every failure into an `Error: ...` string
/// the model can read.
async fn dispatch(
    call: &MessageToolCall,
    arguments: Result<Value, serde_json::Error>,
    registry: &ToolRegistry,
) -> String {
    let arguments = match arguments {
        Ok(arguments) => arguments,
        Err(e) => {
            warn!(tool = %call.name, error = %e, "Unparseable tool arguments");
            return format!("Error: invalid arguments for tool '{}': {e}", call.name);
        }
    };

    let call = ToolCall {
        id: call.id.clone(),
        name: call.name.clone(),
        arguments,
    };

    match registry.execute(&call).await {
        Ok(result) => {
            debug!(tool = %call.name, "Tool completed");
            result.into_content()
        }
        Err(e) => {
            warn!(tool = %call.name, error = %e, "Tool execution failed");
            format!("Error: {e}")
        }
    }
}
