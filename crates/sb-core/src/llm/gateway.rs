//! Model Gateway
//!
//! Owns everything that is fixed for the lifetime of a run: the system
//! instruction, the tool catalog, and the inference parameters. Each call
//! sends the full turn history, appends the model's output turn to it, and
//! returns the normalized (stop reason, content blocks) pair the
//! conversation loop dispatches on.

use std::time::Duration;

use tracing::warn;

use crate::config::RetryConfig;
use crate::error::{Error, Result};

use super::client::ModelClient;
use super::types::*;

/// Fixed inference parameters for a run
#[derive(Debug, Clone, Copy)]
pub struct InferenceParams {
    pub temperature: f64,
    pub max_tokens: u64,
    pub top_p: f64,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 300,
            top_p: 0.0,
        }
    }
}

/// Bounded retry with exponential backoff for transient provider failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        // 1x, 2x, 4x, ... capped at 60s
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        (self.base_delay * factor).min(Duration::from_secs(60))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 500)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.base_delay_ms)
    }
}

/// The model's latest turn, normalized for the conversation loop
#[derive(Debug, Clone)]
pub struct ModelTurn {
    pub stop_reason: StopReason,
    pub content: Vec<MessageContent>,
}

/// Gateway to the model provider
///
/// Constructed explicitly and passed into the conversation loop, so tests
/// can point it at a local double via the client's base URL.
pub struct ModelGateway {
    client: ModelClient,
    system: String,
    tools: Vec<ToolDefinition>,
    params: InferenceParams,
    retry: RetryPolicy,
}

impl ModelGateway {
    pub fn new(
        client: ModelClient,
        system: impl Into<String>,
        tools: Vec<ToolDefinition>,
    ) -> Self {
        Self {
            client,
            system: system.into(),
            tools,
            params: InferenceParams::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_params(mut self, params: InferenceParams) -> Self {
        self.params = params;
        self
    }

    /// Complete one model turn against the current history.
    ///
    /// Appends the model's output turn to `history` before returning;
    /// mutation of the history is the gateway's responsibility, not the
    /// caller's.
    pub async fn complete(&self, history: &mut Vec<Message>) -> Result<ModelTurn> {
        let request = MessagesRequest {
            model: self.client.model().to_string(),
            max_tokens: self.params.max_tokens,
            system: Some(self.system.clone()),
            messages: history.clone(),
            tools: if self.tools.is_empty() {
                None
            } else {
                Some(self.tools.clone())
            },
            temperature: Some(self.params.temperature),
            top_p: Some(self.params.top_p),
        };

        let response = self.send_with_retry(&request).await?;

        history.push(Message::assistant(response.content.clone()));

        Ok(ModelTurn {
            stop_reason: response.stop_reason,
            content: response.content,
        })
    }

    async fn send_with_retry(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let mut attempt: u32 = 0;

        loop {
            match self.client.messages(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retry.max_retries && is_transient(&e) => {
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying model call after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Whether a provider failure is worth retrying
fn is_transient(err: &Error) -> bool {
    match err {
        Error::Http(e) => e.is_connect() || e.is_timeout(),
        Error::Api { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> LlmConfig {
        LlmConfig {
            api_key: "test-key".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: None,
        }
    }

    fn gateway_for(server: &MockServer) -> ModelGateway {
        let client = ModelClient::with_base_url(&test_config(), server.uri()).unwrap();
        ModelGateway::new(client, "test system prompt", vec![])
            .with_retry(RetryPolicy::new(2, 10))
    }

    fn end_turn_body(text: &str) -> serde_json::Value {
        json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-20250514",
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    #[tokio::test]
    async fn test_complete_appends_assistant_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(end_turn_body("hello")))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let mut history = vec![Message::user("hi")];

        let turn = gateway.complete(&mut history).await.unwrap();

        assert_eq!(turn.stop_reason, StopReason::EndTurn);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, "assistant");
        assert_eq!(history[1].text_content(), "hello");
    }

    #[tokio::test]
    async fn test_retries_transient_errors_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(end_turn_body("recovered")))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let mut history = vec![Message::user("hi")];

        let turn = gateway.complete(&mut history).await.unwrap();
        assert_eq!(turn.stop_reason, StopReason::EndTurn);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_auth_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let mut history = vec![Message::user("hi")];

        let err = gateway.complete(&mut history).await.unwrap_err();
        match err {
            Error::Api { status, .. } => assert_eq!(status, 401),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
        // History must be untouched on failure.
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let mut history = vec![Message::user("hi")];

        let err = gateway.complete(&mut history).await.unwrap_err();
        match err {
            Error::Api { status, .. } => assert_eq!(status, 500),
            other => panic!("unexpected error: {:?}", other),
        }
        // Initial call + 2 retries.
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        let policy = RetryPolicy::new(10, 1000);
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(9), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_request_carries_fixed_params_and_system() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(end_turn_body("ok")))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let mut history = vec![Message::user("hi")];
        gateway.complete(&mut history).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["system"], "test system prompt");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["top_p"], 0.0);
        assert_eq!(body["max_tokens"], 300);
    }
}
