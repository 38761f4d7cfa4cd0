use crate::error::ToolError;
use alloy::{primitives::Address, providers::ProviderBuilder};
use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;
use url::Url;

/// Chains the bot can read balances from: Ethereum mainnet, Optimism and Base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Eth,
    Op,
    Base,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Eth, Network::Op, Network::Base];

    pub fn tag(self) -> &'static str {
        match self {
            Network::Eth => "eth",
            Network::Op => "op",
            Network::Base => "base",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNetwork(pub String);

impl fmt::Display for UnknownNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown network '{}': expected one of eth, op, base",
            self.0
        )
    }
}

impl std::error::Error for UnknownNetwork {}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|n| n.tag() == s)
            .ok_or_else(|| UnknownNetwork(s.to_string()))
    }
}

// Goes through FromStr so every tool reports an unknown tag the same way.
impl<'de> Deserialize<'de> for Network {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

pub type HttpProvider = alloy::providers::RootProvider<
    alloy::transports::http::Http<alloy::transports::http::Client>,
>;

#[derive(Clone)]
pub struct EthereumClient {
    pub network: Network,
    pub provider: HttpProvider,
}

impl EthereumClient {
    pub fn new(network: Network, rpc_url: &str) -> Result<Self> {
        let url = Url::parse(rpc_url)?;
        let provider = ProviderBuilder::new().on_http(url);

        Ok(Self { network, provider })
    }
}

/// One client per configured chain, built once at startup.
#[derive(Clone, Default)]
pub struct NetworkPool {
    clients: HashMap<Network, EthereumClient>,
}

impl NetworkPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_endpoints<'a>(
        endpoints: impl IntoIterator<Item = (Network, &'a str)>,
    ) -> Result<Self> {
        let mut pool = Self::new();
        for (network, rpc_url) in endpoints {
            pool.insert(EthereumClient::new(network, rpc_url)?);
            info!(%network, "RPC client ready");
        }
        Ok(pool)
    }

    pub fn insert(&mut self, client: EthereumClient) {
        self.clients.insert(client.network, client);
    }

    pub fn client(&self, network: Network) -> Result<&EthereumClient, ToolError> {
        self.clients
            .get(&network)
            .ok_or(ToolError::NetworkUnavailable(network))
    }

    pub fn networks(&self) -> Vec<Network> {
        Network::ALL
            .into_iter()
            .filter(|n| self.clients.contains_key(n))
            .collect()
    }
}

/// Parses a hex address the way web3's `is_address` accepts it: all-lowercase
/// and all-uppercase hex pass as-is, mixed case must carry a valid EIP-55
/// checksum.
pub fn parse_address(raw: &str) -> Result<Address, ToolError> {
    let trimmed = raw.trim();
    let address =
        Address::from_str(trimmed).map_err(|_| ToolError::InvalidAddress(raw.to_string()))?;

    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let mixed_case = digits.chars().any(|c| c.is_ascii_lowercase())
        && digits.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case && address.to_checksum(None)[2..] != *digits {
        return Err(ToolError::InvalidAddress(raw.to_string()));
    }

    Ok(address)
}
