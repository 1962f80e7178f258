use crate::api_types::Tool;
use crate::engine::{ToolErrorKind, ToolOutcome};

// ============================================================================
// ToolHandler trait
// ============================================================================

#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Unique name used for dispatch (must match the tool name in schema).
    fn name(&self) -> &str;

    /// Human-readable description for logging.
    fn description(&self) -> &str;

    /// JSON schema sent to the LLM so it knows how to call this tool.
    fn schema(&self) -> Tool;

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: &serde_json::Value) -> ToolOutcome;
}

// ============================================================================
// ToolRegistry
// ============================================================================

#[derive(Debug, thiserror::Error)]
#[error("tool '{0}' is already registered")]
pub struct DuplicateTool(pub String);

/// Ordered collection of tool handlers. Declaration order is preserved and
/// the schema list is stable across calls within a run, so the model sees an
/// identical tool block every turn.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: Vec<Box<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a tool handler. Names must be unique.
    pub fn register(&mut self, handler: Box<dyn ToolHandler>) -> Result<(), DuplicateTool> {
        if self.handlers.iter().any(|h| h.name() == handler.name()) {
            return Err(DuplicateTool(handler.name().to_string()));
        }
        tracing::debug!("Registered tool: {}", handler.name());
        self.handlers.push(handler);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Get the list of Tool schemas for the LLM, in declaration order.
    pub fn available_tools(&self) -> Vec<Tool> {
        self.handlers.iter().map(|h| h.schema()).collect()
    }

    /// Dispatch a tool call by name. Unknown names come back as a permanent
    /// error outcome, never a panic or an escaping error.
    pub async fn dispatch(&self, name: &str, input: &serde_json::Value) -> ToolOutcome {
        match self.handlers.iter().find(|h| h.name() == name) {
            Some(handler) => handler.execute(input).await,
            None => ToolOutcome {
                content: format!("Unknown tool: {}", name),
                is_error: true,
                error_kind: Some(ToolErrorKind::Permanent),
            },
        }
    }
}
