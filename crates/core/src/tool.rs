//! Tool trait — the abstraction over capabilities the model can invoke.
//!
//! Tools give the orchestration loop a way to reach outside the model:
//! search the web, fetch pages, look up marketplace prices, compute margins.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use crate::error::ToolError;
use crate::provider::ToolDefinition;
use crate::schema::prepare_arguments;

/// A parsed request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the model's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: Value,
}

/// The output of a tool execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    /// Free text, embedded verbatim.
    Text(String),
    /// Structured data, serialized to JSON text when embedded.
    Json(Value),
}

impl ToolResult {
    /// Serialize any value into a structured result.
    pub fn json<T: Serialize>(tool_name: &str, value: &T) -> Result<Self, ToolError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| ToolError::failed(tool_name, e))
    }

    /// The string form placed in the tool-role message.
    pub fn into_content(self) -> String {
        match self {
            Self::Text(text) | Self::Json(Value::String(text)) => text,
            Self::Json(value) => value.to_string(),
        }
    }
}

impl From<String> for ToolResult {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for ToolResult {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// The core Tool trait.
///
/// Each tool (web_search, fetch_page, calculate_margin, ...) implements this
/// trait and is registered in a `ToolRegistry` for the use case that needs it.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "web_search").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Progress text shown to streaming clients before the tool runs.
    fn status_message(&self, _arguments: &Value) -> String {
        format!("Running {}...", self.name())
    }

    /// Execute the tool with already-validated arguments.
    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<ToolResult, ToolError>> + Send + Sync>;

/// Adapts a definition plus an async closure into a `Tool`.
#[derive(Clone)]
pub struct FnTool {
    definition: ToolDefinition,
    handler: Handler,
}

impl FnTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
    {
        Self {
            definition,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool").field("name", &self.definition.name).finish()
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn description(&self) -> &str {
        &self.definition.description
    }

    fn parameters_schema(&self) -> Value {
        self.definition.parameters.clone()
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        (self.handler)(arguments).await
    }

    fn to_definition(&self) -> ToolDefinition {
        self.definition.clone()
    }
}

/// A registry of available tools.
///
/// The orchestration loop uses this to:
/// 1. Get tool definitions to send to the model
/// 2. Look up, validate and execute tools when the model requests them
///
/// Cloning is cheap: tools are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any existing tool with the same name,
    /// keeping its original position.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, Arc::from(tool));
    }

    /// Register a closure-backed tool.
    pub fn register_fn<F, Fut>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
    {
        self.register(Box::new(FnTool::new(definition, handler)));
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Like `get`, but reports an unregistered name as `ToolError::NotFound`.
    pub fn lookup(&self, name: &str) -> Result<&dyn Tool, ToolError> {
        self.get(name).ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// All tool definitions in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.to_definition())
            .collect()
    }

    /// Validate the call's arguments against the tool schema, then execute.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let tool = self.lookup(&call.name)?;
        tracing::debug!(tool = %call.name, call_id = %call.id, "Executing tool");
        let arguments = prepare_arguments(&call.name, &tool.parameters_schema(), call.arguments.clone())?;
        tool.execute(arguments).await
    }

    /// List all registered tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.order).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" },
                    "times": { "type": "integer", "default": 1 }
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
            let text = arguments["text"].as_str().unwrap_or("");
            let times = arguments["times"].as_u64().unwrap_or(0) as usize;
            Ok(ToolResult::Text(text.repeat(times)))
        }
    }

    fn definition(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.into(),
            description: format!("{name} tool"),
            parameters: json!({"type": "object", "properties": {}}),
        }
    }

    #[tokio::test]
    async fn registry_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let call = ToolCall {
            id: "call_1".into(),
            name: "echo".into(),
            arguments: json!({"text": "hello"}),
        };
        let result = registry.execute(&call).await.unwrap();
        assert_eq!(result, ToolResult::Text("hello".into()));
    }

    #[tokio::test]
    async fn registry_applies_defaults_before_execution() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let call = ToolCall {
            id: "call_1".into(),
            name: "echo".into(),
            arguments: json!({"text": "ab", "times": 3}),
        };
        assert_eq!(registry.execute(&call).await.unwrap().into_content(), "ababab");
    }

    #[tokio::test]
    async fn registry_rejects_invalid_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let call = ToolCall {
            id: "call_1".into(),
            name: "echo".into(),
            arguments: json!({}),
        };
        let err = registry.execute(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn registry_tool_not_found() {
        let registry = ToolRegistry::new();
        let call = ToolCall {
            id: "call_1".into(),
            name: "search".into(),
            arguments: json!({}),
        };
        let err = registry.execute(&call).await.unwrap_err();
        assert_eq!(err.to_string(), "no handler for tool 'search'");
    }

    #[tokio::test]
    async fn register_fn_adapts_closures() {
        let mut registry = ToolRegistry::new();
        registry.register_fn(definition("answer"), |_args| async { Ok(ToolResult::Json(json!({"n": 42}))) });

        let call = ToolCall {
            id: "c".into(),
            name: "answer".into(),
            arguments: Value::Null,
        };
        let result = registry.execute(&call).await.unwrap();
        assert_eq!(result.into_content(), r#"{"n":42}"#);
    }

    #[test]
    fn definitions_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["web_search", "fetch_page", "calculate_margin"] {
            registry.register_fn(definition(name), |_| async { Ok(ToolResult::Text(String::new())) });
        }
        // Re-registering keeps the slot.
        registry.register_fn(definition("web_search"), |_| async { Ok(ToolResult::Text(String::new())) });

        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["web_search", "fetch_page", "calculate_margin"]);
        assert_eq!(registry.names(), ["web_search", "fetch_page", "calculate_margin"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn lookup_reports_unknown_names() {
        let registry = ToolRegistry::new();
        assert!(registry.get("echo").is_none());
        assert!(matches!(registry.lookup("echo"), Err(ToolError::NotFound(_))));
    }

    #[test]
    fn tool_result_content() {
        assert_eq!(ToolResult::Text("plain".into()).into_content(), "plain");
        assert_eq!(ToolResult::Json(json!("quoted")).into_content(), "quoted");
        assert_eq!(ToolResult::Json(json!([1, 2])).into_content(), "[1,2]");
    }

    #[test]
    fn default_status_message_names_the_tool() {
        assert_eq!(EchoTool.status_message(&json!({})), "Running echo...");
    }

    #[test]
    fn tool_to_definition() {
        let def = EchoTool.to_definition();
        assert_eq!(def.name, "echo");
        assert_eq!(def.description, "Echoes back the input");
        assert!(def.parameters["properties"]["text"].is_object());
    }
}
