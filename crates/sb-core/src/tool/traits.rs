//! Tool trait definition
//!
//! Implement [`Tool`] to expose a capability the model can request via
//! tool_use content blocks.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::Result;

/// Tool execution result
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Output payload from tool execution, serialized for the model
    pub output: String,
    /// Whether the execution resulted in an error
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: true,
        }
    }
}

/// A capability the model can invoke by name
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name; acts as the dispatch key and must be unique
    fn name(&self) -> &str;

    /// Free-text description consumed by the model when selecting tools
    fn description(&self) -> &str;

    /// JSON schema for the tool's input payload
    fn input_schema(&self) -> JsonValue;

    /// Execute the tool with the given input
    async fn execute(&self, input: JsonValue) -> Result<ToolResult>;
}
