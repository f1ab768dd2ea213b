//! sb-core: stockbot core library
//!
//! Wire types and HTTP client for the model provider, the tool registry,
//! and the conversation loop that drives tool-augmented turns to a final
//! answer.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod tool;

pub use agent::{run_conversation, RunOutcome, SYSTEM_PROMPT};
pub use config::{AgentConfig, Config, LlmConfig, QuoteConfig, RetryConfig};
pub use error::{Error, Result};
pub use llm::{
    InferenceParams, Message, MessageContent, ModelClient, ModelGateway, ModelTurn, RetryPolicy,
    StopReason, ToolDefinition,
};
pub use tool::{Tool, ToolRegistry, ToolResult};
