use crate::ethereum::Network;
use anyhow::{bail, Context};
use std::env;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_MODEL: &str = "gpt-4.1";
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_SEARCH_MAX_RESULTS: usize = 5;
pub const DEFAULT_MAX_STEPS: usize = 25;

#[derive(Clone, Debug)]
pub struct Config {
    pub eth_rpc_url: Option<String>,
    pub op_rpc_url: Option<String>,
    pub base_rpc_url: Option<String>,
    pub discord_webhook: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_endpoint: String,
    pub tavily_api_key: Option<String>,
    pub search_max_results: usize,
    pub max_steps: usize,
    pub prompt_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let eth_rpc_url = get("ETH_MAINNET_RPC");
        let op_rpc_url = get("OP_MAINNET_RPC");
        let base_rpc_url = get("BASE_MAINNET_RPC");
        for (key, value) in [
            ("ETH_MAINNET_RPC", &eth_rpc_url),
            ("OP_MAINNET_RPC", &op_rpc_url),
            ("BASE_MAINNET_RPC", &base_rpc_url),
        ] {
            if let Some(url) = value {
                Url::parse(url).with_context(|| format!("{key} is not a valid URL"))?;
            }
        }
        if eth_rpc_url.is_none() && op_rpc_url.is_none() && base_rpc_url.is_none() {
            bail!("at least one of ETH_MAINNET_RPC, OP_MAINNET_RPC, BASE_MAINNET_RPC must be set");
        }

        let discord_webhook = get("DISCORD_WEBHOOK").context("DISCORD_WEBHOOK must be set")?;
        Url::parse(&discord_webhook).context("DISCORD_WEBHOOK is not a valid URL")?;

        let openai_api_key = get("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
        let openai_model = get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let openai_endpoint =
            get("OPENAI_ENDPOINT").unwrap_or_else(|| DEFAULT_CHAT_ENDPOINT.to_string());
        Url::parse(&openai_endpoint).context("OPENAI_ENDPOINT is not a valid URL")?;

        let search_max_results = match get("SEARCH_MAX_RESULTS") {
            Some(v) => v
                .parse()
                .context("SEARCH_MAX_RESULTS must be a positive integer")?,
            None => DEFAULT_SEARCH_MAX_RESULTS,
        };
        let max_steps = match get("AGENT_MAX_STEPS") {
            Some(v) => v
                .parse()
                .context("AGENT_MAX_STEPS must be a positive integer")?,
            None => DEFAULT_MAX_STEPS,
        };
        if search_max_results == 0 || max_steps == 0 {
            bail!("SEARCH_MAX_RESULTS and AGENT_MAX_STEPS must be greater than zero");
        }

        Ok(Self {
            eth_rpc_url,
            op_rpc_url,
            base_rpc_url,
            discord_webhook,
            openai_api_key,
            openai_model,
            openai_endpoint,
            tavily_api_key: get("TAVILY_API_KEY"),
            search_max_results,
            max_steps,
            prompt_file: get("DIGEST_PROMPT_FILE").map(PathBuf::from),
        })
    }

    pub fn rpc_endpoints(&self) -> Vec<(Network, &str)> {
        [
            (Network::Eth, &self.eth_rpc_url),
            (Network::Op, &self.op_rpc_url),
            (Network::Base, &self.base_rpc_url),
        ]
        .into_iter()
        .filter_map(|(network, url)| url.as_deref().map(|u| (network, u)))
        .collect()
    }
}
