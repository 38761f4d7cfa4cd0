use crate::ethereum::Network;
use thiserror::Error;

/// Failure of a single tool invocation.
///
/// Everything except a notification failure is reported back to the model
/// and the session continues.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("invalid address provided: {0}")]
    InvalidAddress(String),

    #[error("no RPC endpoint configured for network '{0}'")]
    NetworkUnavailable(Network),

    #[error("rpc call failed: {0}")]
    Rpc(String),

    #[error("failed to decode contract response: {0}")]
    Decode(String),

    #[error("balance conversion failed: {0}")]
    Conversion(String),

    #[error("web search failed: {0}")]
    Search(String),

    #[error("failed to send message to discord: {status} {body}")]
    Notification { status: u16, body: String },

    #[error("failed to reach discord webhook: {0}")]
    NotificationTransport(String),
}

impl ToolError {
    /// Fatal errors terminate the agent session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ToolError::Notification { .. } | ToolError::NotificationTransport(_)
        )
    }

    pub(crate) fn invalid_arguments(tool: &str, reason: impl ToString) -> Self {
        ToolError::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model request failed: {0}")]
    Model(String),

    #[error("model returned {status}: {body}")]
    ModelStatus { status: u16, body: String },

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("agent stopped after {0} steps without a final answer")]
    StepLimit(usize),

    #[error("tool {tool} failed fatally: {source}")]
    FatalTool {
        tool: String,
        #[source]
        source: ToolError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Model(err.to_string())
    }
}
