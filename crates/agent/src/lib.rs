//! The tool-calling orchestration loop for Rangaayan AI.
//!
//! A run follows a **request → act → observe** cycle:
//!
//! 1. **Send** the conversation and the available tool specs to the model
//! 2. **If tool calls**: execute each tool in order, append the results, loop back
//! 3. **If text**: that is the answer
//!
//! The final round withholds tools so the model has to answer. Runs can be
//! blocking (`ToolLoop::run`) or streamed as `LoopEvent`s
//! (`ToolLoop::run_stream`).

pub mod loop_runner;
pub mod stream_event;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use loop_runner::{DEFAULT_MAX_ITERATIONS, INCOMPLETE_MESSAGE, LoopError, LoopOutcome, ToolLoop};
pub use stream_event::LoopEvent;
