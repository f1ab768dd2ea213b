//! Conversation loop
//!
//! Drives repeated gateway calls until the model produces a final answer:
//! every tool_use block in a model turn is dispatched through the registry
//! and answered with a tool_result turn before the next call. Unsupported
//! stop reasons end the run without an answer.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::llm::{text_of, Message, MessageContent, ModelGateway, StopReason};
use crate::tool::{ToolRegistry, ToolResult};

/// System instruction fixed for every run
pub const SYSTEM_PROMPT: &str = "You are a stock market bot that provides accurate ticker \
    prices in any currency. Use your tools to get stock prices, and convert to another \
    currency when asked.";

/// Terminal outcome of a conversation run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The model ended its turn; the concatenated text of its final
    /// response, in block order.
    Answer(String),
    /// The model stopped for a reason the loop does not support; the run
    /// ends without an answer.
    Aborted(StopReason),
}

/// Run one conversation from user input to a terminal outcome.
///
/// The turn history is created here from `input`, owned by the loop, and
/// only ever appended to. Provider failures surviving the gateway's retry
/// policy propagate as errors; exceeding `max_turns` gateway calls is
/// [`Error::TurnLimit`].
pub async fn run_conversation(
    gateway: &ModelGateway,
    registry: &ToolRegistry,
    input: &str,
    max_turns: usize,
) -> Result<RunOutcome> {
    let mut history = vec![Message::user(input)];
    let mut turns = 0usize;

    loop {
        turns += 1;
        if turns > max_turns {
            return Err(Error::TurnLimit(max_turns));
        }

        let turn = gateway.complete(&mut history).await?;
        debug!(turns, stop_reason = %turn.stop_reason, "Model turn completed");

        match turn.stop_reason {
            StopReason::EndTurn => {
                let answer = text_of(&turn.content);
                info!(turns, "Model ended turn with final answer");
                return Ok(RunOutcome::Answer(answer));
            }
            StopReason::ToolUse => {
                let requests: Vec<(String, String, serde_json::Value)> = turn
                    .content
                    .iter()
                    .filter_map(|c| match c {
                        MessageContent::ToolUse { id, name, input } => {
                            Some((id.clone(), name.clone(), input.clone()))
                        }
                        _ => None,
                    })
                    .collect();

                if requests.is_empty() {
                    warn!("tool_use stop reason without tool_use blocks");
                    continue;
                }

                // Every request gets exactly one result turn, in request
                // order, before the next gateway call.
                for (id, name, input) in requests {
                    info!(tool = %name, tool_use_id = %id, "Dispatching tool");

                    let result = match registry.execute(&name, input).await {
                        Ok(result) => result,
                        Err(e) => ToolResult::error(e.to_string()),
                    };

                    if result.is_error {
                        warn!(tool = %name, "Tool failed: {}", result.output);
                    } else {
                        debug!(tool = %name, "Tool result: {} chars", result.output.len());
                    }

                    history.push(Message::tool_result(id, result.output, result.is_error));
                }
            }
            unsupported => {
                warn!(
                    stop_reason = %unsupported,
                    "Model stopped for an unsupported reason; ending run without an answer"
                );
                return Ok(RunOutcome::Aborted(unsupported));
            }
        }
    }
}
