//! Model provider integration: wire types, HTTP client, and the gateway
//! driving one completion per conversation turn.

pub mod client;
pub mod gateway;
pub mod types;

pub use client::ModelClient;
pub use gateway::{InferenceParams, ModelGateway, ModelTurn, RetryPolicy};
pub use types::{
    text_of, Message, MessageContent, MessagesRequest, MessagesResponse, StopReason,
    ToolDefinition, Usage,
};
