use crate::error::AgentError;
use crate::llm::{ChatMessage, ChatModel, ModelReply};
use crate::tools::ToolRegistry;
use anyhow::Context;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info, warn};

/// The daily summary request given to the model.
pub const DEFAULT_PROMPT: &str = "\
Find or use (if you already know them) the contract addresses for USDC, EURC and
Ethena sUSDe (0x9d39a5de30e57443bff2a8307a4256c8797a3497). Look each one up in a
separate search on the Ethereum network, then get the balances of those tokens and
of ETH for eth:0x1Db51d6F3349Db0846496db5C8A588b44fF3f09C.

Send those balances (ignore zero or small ones) to Discord as a daily summary,
together with the total value in USD and EUR.

Along with the balances, add a short summary of today's market and what caused
the price changes, if any bigger events happened.

Build the message nicely: use emojis and readable formatting suited to Discord.

Use the same format as yesterday: same sections, same style and same emoji usage.
";

pub fn load_prompt(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read prompt file {}", path.display())),
        None => Ok(DEFAULT_PROMPT.to_string()),
    }
}

/// Runs one tool-using conversation to completion.
pub struct Agent<M> {
    model: M,
    registry: ToolRegistry,
    max_steps: usize,
}

impl<M: ChatModel> Agent<M> {
    pub fn new(model: M, registry: ToolRegistry, max_steps: usize) -> Self {
        Self {
            model,
            registry,
            max_steps,
        }
    }

    /// Returns the model's final message. Only fatal tool errors end the
    /// session early.
    pub async fn run(&self, prompt: &str) -> Result<String, AgentError> {
        let tools = self.registry.definitions();
        let mut messages = vec![ChatMessage::user(prompt)];

        for step in 1..=self.max_steps {
            let reply = self.model.complete(&messages, &tools).await?;

            let (content, calls) = match reply {
                ModelReply::Final(content) => {
                    info!(step, "agent finished");
                    info!("{content}");
                    return Ok(content);
                }
                ModelReply::ToolCalls { content, calls } => (content, calls),
            };

            if !content.is_empty() {
                info!(step, "{content}");
            }
            messages.push(ChatMessage::assistant_with_tools(content, calls.clone()));

            for call in calls {
                info!(step, tool = %call.name, "calling tool");
                debug!(tool = %call.name, arguments = %call.arguments);

                let output = match self.registry.dispatch(&call.name, &call.arguments).await {
                    Ok(value) => value,
                    Err(e) if e.is_fatal() => {
                        return Err(AgentError::FatalTool {
                            tool: call.name,
                            source: e,
                        });
                    }
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "tool call failed");
                        json!({ "error": e.to_string() })
                    }
                };

                info!(step, tool = %call.name, result = %output);
                messages.push(ChatMessage::tool(call.id, output.to_string()));
            }
        }

        Err(AgentError::StepLimit(self.max_steps))
    }
}
