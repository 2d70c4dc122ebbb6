//! # Rangaayan Core
//!
//! Domain types, traits, and error definitions for the Rangaayan AI backend.
//! This crate has **zero framework dependencies**: it defines the domain model
//! (messages, conversation state, providers, tools) that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates, so tests can swap in scripted providers
//! and in-memory tools without touching the network.

pub mod error;
pub mod message;
pub mod provider;
pub mod schema;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, ToolError};
pub use message::{Content, ContentPart, Conversation, Message, MessageToolCall, Role};
pub use provider::{Choice, Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{FnTool, Tool, ToolCall, ToolRegistry, ToolResult};
