use super::Tool;
use crate::error::ToolError;
use reqwest::{Client, StatusCode};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SendToDiscordArgs {
    /// The fully formatted message to post
    pub message: String,
}

/// Posts messages to a fixed Discord webhook.
///
/// Any response other than `204 No Content` is fatal for the run.
pub struct SendToDiscordTool {
    client: Client,
    webhook_url: String,
}

impl SendToDiscordTool {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }

    pub async fn send(&self, message: &str) -> Result<(), ToolError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "content": message }))
            .send()
            .await
            .map_err(|e| ToolError::NotificationTransport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {e}>"));

        if status != StatusCode::NO_CONTENT {
            error!(status = status.as_u16(), %body, "discord webhook rejected message");
            return Err(ToolError::Notification {
                status: status.as_u16(),
                body,
            });
        }

        info!(status = status.as_u16(), "message sent to discord");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Tool for SendToDiscordTool {
    type Args = SendToDiscordArgs;
    const NAME: &'static str = "send_to_discord";

    fn description(&self) -> &'static str {
        "Posts a message to the Discord channel"
    }

    async fn call(&self, args: SendToDiscordArgs) -> Result<Value, ToolError> {
        self.send(&args.message).await?;
        Ok(json!(true))
    }
}
