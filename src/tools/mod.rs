pub mod balance;
pub mod date;
pub mod discord;
pub mod search;

use crate::config::Config;
use crate::error::ToolError;
use crate::ethereum::NetworkPool;
use schemars::{gen::SchemaSettings, JsonSchema};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A tool the model can call by name. `Args` doubles as its JSON schema.
#[async_trait::async_trait]
pub trait Tool: Send + Sync + 'static {
    type Args: DeserializeOwned + JsonSchema + Send;

    const NAME: &'static str;

    fn description(&self) -> &'static str;

    async fn call(&self, args: Self::Args) -> Result<Value, ToolError>;
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

#[async_trait::async_trait]
pub trait RegisteredTool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn schema(&self) -> Value;
    async fn invoke(&self, args: Value) -> Result<Value, ToolError>;
}

#[async_trait::async_trait]
impl<T: Tool> RegisteredTool for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn description(&self) -> &'static str {
        Tool::description(self)
    }

    fn schema(&self) -> Value {
        input_schema::<T::Args>()
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let typed: T::Args =
            serde_json::from_value(args).map_err(|e| ToolError::invalid_arguments(T::NAME, e))?;
        self.call(typed).await
    }
}

/// JSON schema for a tool's arguments, with every subschema inlined so the
/// model never has to resolve `$ref`s.
pub fn input_schema<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|s| {
            s.inline_subschemas = true;
            s.meta_schema = None;
        })
        .into_generator();
    let mut schema = json!(generator.into_root_schema_for::<T>());
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("title");
        obj.remove("definitions");
        // Argument-less tools still need an explicit empty object schema.
        obj.entry("properties").or_insert_with(|| json!({}));
    }
    schema
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn RegisteredTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Tool>(&mut self, tool: T) {
        self.tools.insert(T::NAME, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RegisteredTool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn definitions(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.schema()
                    }
                })
            })
            .collect()
    }

    /// Validates `raw_arguments` against the tool's input type and runs it.
    pub async fn dispatch(&self, name: &str, raw_arguments: &str) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let args: Value = if raw_arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(raw_arguments)
                .map_err(|e| ToolError::invalid_arguments(name, e))?
        };
        debug!(tool = name, %args, "dispatching tool call");

        tool.invoke(args).await
    }
}

/// The bot's full tool set. `web_search` is left out when no Tavily key is
/// configured.
pub fn default_registry(config: &Config, pool: Arc<NetworkPool>) -> anyhow::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();

    registry.register(discord::SendToDiscordTool::new(config.discord_webhook.clone())?);
    registry.register(balance::GetErc20BalanceTool::new(pool.clone()));
    registry.register(balance::GetNativeBalanceTool::new(pool));
    registry.register(date::GetTodaysDateTool);

    match &config.tavily_api_key {
        Some(key) => registry.register(search::WebSearchTool::new(
            key.clone(),
            config.search_max_results,
        )?),
        None => warn!("TAVILY_API_KEY not set, web_search disabled"),
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethereum::Network;

    #[derive(Debug, Deserialize, JsonSchema)]
    #[serde(deny_unknown_fields)]
    struct EchoArgs {
        /// Text to echo back
        text: String,
        network: Network,
    }

    struct EchoTool;

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        type Args = EchoArgs;
        const NAME: &'static str = "echo";

        fn description(&self) -> &'static str {
            "Echo the text back"
        }

        async fn call(&self, args: EchoArgs) -> Result<Value, ToolError> {
            Ok(json!({ "text": args.text, "network": args.network }))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        registry.register(date::GetTodaysDateTool);
        registry
    }

    #[test]
    fn registers_tools_by_name() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["echo", "get_todays_date"]);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn default_registry_skips_search_without_key() {
        let base = [
            ("ETH_MAINNET_RPC", "http://localhost:8545"),
            ("DISCORD_WEBHOOK", "http://localhost/webhook"),
            ("OPENAI_API_KEY", "sk-test"),
        ];
        let lookup = |with_key: bool| {
            move |key: &str| {
                if with_key && key == "TAVILY_API_KEY" {
                    return Some("tvly-test".to_string());
                }
                base.iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.to_string())
            }
        };

        let config = Config::from_lookup(lookup(false)).unwrap();
        let registry = default_registry(&config, Arc::new(NetworkPool::new())).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "get_erc20_balance",
                "get_native_balance",
                "get_todays_date",
                "send_to_discord"
            ]
        );

        let config = Config::from_lookup(lookup(true)).unwrap();
        let registry = default_registry(&config, Arc::new(NetworkPool::new())).unwrap();
        assert_eq!(registry.len(), 5);
        assert!(registry.get("web_search").is_some());
    }

    #[test]
    fn schema_is_inlined_and_typed() {
        let schema = input_schema::<EchoArgs>();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["text"]["type"], "string");
        assert_eq!(schema["properties"]["text"]["description"], "Text to echo back");
        assert_eq!(
            schema["properties"]["network"]["enum"],
            json!(["eth", "op", "base"])
        );
        assert_eq!(schema["additionalProperties"], false);
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("definitions").is_none());

        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("text")));
        assert!(required.contains(&json!("network")));
    }

    #[test]
    fn empty_args_schema_has_properties() {
        let schema = input_schema::<NoArgs>();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"], json!({}));
    }

    #[test]
    fn definitions_use_function_format() {
        let defs = registry().definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0]["type"], "function");
        assert_eq!(defs[0]["function"]["name"], "echo");
        assert_eq!(defs[1]["function"]["name"], "get_todays_date");
        assert!(defs[0]["function"]["parameters"].is_object());
    }

    #[tokio::test]
    async fn dispatch_runs_valid_call() {
        let out = registry()
            .dispatch("echo", r#"{"text": "gm", "network": "base"}"#)
            .await
            .unwrap();
        assert_eq!(out, json!({ "text": "gm", "network": "base" }));
    }

    #[tokio::test]
    async fn dispatch_accepts_blank_arguments_for_no_arg_tools() {
        let out = registry().dispatch("get_todays_date", "").await.unwrap();
        assert!(out.is_string());
    }

    #[tokio::test]
    async fn dispatch_rejects_before_invocation() {
        let registry = registry();

        let err = registry.dispatch("nope", "{}").await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "nope"));

        let err = registry.dispatch("echo", "{not json").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        let err = registry
            .dispatch("echo", r#"{"network": "eth"}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing field `text`"));

        let err = registry
            .dispatch("echo", r#"{"text": "gm", "network": "eth", "extra": 1}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown field `extra`"));

        let err = registry
            .dispatch("echo", r#"{"text": "gm", "network": "arb"}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown network 'arb'"));
        assert!(!err.is_fatal());
    }
}
