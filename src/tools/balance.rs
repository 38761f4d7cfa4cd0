use super::Tool;
use crate::error::ToolError;
use crate::ethereum::{parse_address, HttpProvider, Network, NetworkPool};
use alloy::{
    primitives::{Address, Bytes, U256},
    providers::Provider,
    rpc::types::eth::TransactionRequest,
    sol,
    sol_types::SolCall,
};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;

sol! {
    #[allow(missing_docs)]
    function balanceOf(address account) external view returns (uint256);
    #[allow(missing_docs)]
    function decimals() external view returns (uint8);
}

const ETHER_DECIMALS: u8 = 18;

// Largest digit count that always fits in a Decimal mantissa.
const MAX_DECIMAL_DIGITS: usize = 28;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NativeBalanceArgs {
    /// The wallet address to check
    pub address: String,
    /// The network to use
    pub network: Network,
}

pub struct GetNativeBalanceTool {
    pool: Arc<NetworkPool>,
}

impl GetNativeBalanceTool {
    pub fn new(pool: Arc<NetworkPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Tool for GetNativeBalanceTool {
    type Args = NativeBalanceArgs;
    const NAME: &'static str = "get_native_balance";

    fn description(&self) -> &'static str {
        "Get the native ETH balance of an address (in ETH, not Wei) on Ethereum mainnet, Optimism or Base"
    }

    async fn call(&self, args: NativeBalanceArgs) -> Result<Value, ToolError> {
        let client = self.pool.client(args.network)?;
        let address = parse_address(&args.address)?;

        let balance = client
            .provider
            .get_balance(address)
            .await
            .map_err(|e| ToolError::Rpc(e.to_string()))?;
        let formatted = format_units(balance, ETHER_DECIMALS)?;

        Ok(json!({
            "address": address.to_checksum(None),
            "network": args.network,
            "symbol": "ETH",
            "balance": formatted.to_string(),
            "raw_balance": balance.to_string(),
            "decimals": ETHER_DECIMALS
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Erc20BalanceArgs {
    /// The wallet address to check
    pub address: String,
    /// The ERC20 token contract address
    pub contract_address: String,
    /// The network to use
    pub network: Network,
}

pub struct GetErc20BalanceTool {
    pool: Arc<NetworkPool>,
}

impl GetErc20BalanceTool {
    pub fn new(pool: Arc<NetworkPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Tool for GetErc20BalanceTool {
    type Args = Erc20BalanceArgs;
    const NAME: &'static str = "get_erc20_balance";

    fn description(&self) -> &'static str {
        "Get the balance of an ERC20 token for an address, converted using the token's decimals"
    }

    async fn call(&self, args: Erc20BalanceArgs) -> Result<Value, ToolError> {
        let client = self.pool.client(args.network)?;
        let address = parse_address(&args.address)?;
        let token = parse_address(&args.contract_address)?;

        let balance_data = eth_call(
            &client.provider,
            token,
            balanceOfCall { account: address }.abi_encode(),
        )
        .await?;
        let balance: U256 = balanceOfCall::abi_decode_returns(&balance_data, true)
            .map_err(|e| ToolError::Decode(e.to_string()))?
            ._0;

        // Fetched on every call; never cached.
        let decimals_data = eth_call(&client.provider, token, decimalsCall {}.abi_encode()).await?;
        let decimals: u8 = decimalsCall::abi_decode_returns(&decimals_data, true)
            .map_err(|e| ToolError::Decode(e.to_string()))?
            ._0;

        let formatted = format_units(balance, decimals)?;

        Ok(json!({
            "address": address.to_checksum(None),
            "token": token.to_checksum(None),
            "network": args.network,
            "balance": formatted.to_string(),
            "raw_balance": balance.to_string(),
            "decimals": decimals
        }))
    }
}

async fn eth_call(provider: &HttpProvider, to: Address, data: Vec<u8>) -> Result<Bytes, ToolError> {
    let tx_req = TransactionRequest::default().to(to).input(data.into());
    provider
        .call(&tx_req)
        .await
        .map_err(|e| ToolError::Rpc(e.to_string()))
}

/// Converts an integer amount in base units to a normalized decimal
/// (`value / 10^decimals`).
///
/// Fractional digits beyond Decimal's 28-digit precision are truncated.
pub fn format_units(value: U256, decimals: u8) -> Result<Decimal, ToolError> {
    let digits = value.to_string();
    let scale = usize::from(decimals);

    let (int_part, frac_part) = if digits.len() > scale {
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        (int_part.to_string(), frac_part.to_string())
    } else {
        ("0".to_string(), format!("{}{}", "0".repeat(scale - digits.len()), digits))
    };

    let int_digits = if int_part == "0" { 0 } else { int_part.len() };
    if int_digits > MAX_DECIMAL_DIGITS {
        return Err(ToolError::Conversion(format!(
            "{value} with {decimals} decimals does not fit in a decimal"
        )));
    }

    let keep = frac_part.len().min(MAX_DECIMAL_DIGITS - int_digits);
    let literal = if keep == 0 {
        int_part
    } else {
        format!("{int_part}.{}", &frac_part[..keep])
    };

    Decimal::from_str(&literal)
        .map(|d| d.normalize())
        .map_err(|e| ToolError::Conversion(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_wei_to_ether() {
        let wei = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(format_units(wei, 18).unwrap(), dec!(1.5));
        assert_eq!(format_units(U256::ZERO, 18).unwrap(), Decimal::ZERO);
        assert_eq!(format_units(U256::from(1u8), 18).unwrap(), dec!(0.000000000000000001));
    }

    #[test]
    fn converts_token_units() {
        // 1234.56 USDC (6 decimals)
        assert_eq!(
            format_units(U256::from(1_234_560_000u64), 6).unwrap(),
            dec!(1234.56)
        );
        assert_eq!(format_units(U256::from(42u8), 0).unwrap(), dec!(42));
        assert_eq!(format_units(U256::from(5u8), 1).unwrap(), dec!(0.5));
    }

    #[test]
    fn normalizes_trailing_zeros() {
        let formatted = format_units(U256::from(2_000_000_000_000_000_000u128), 18).unwrap();
        assert_eq!(formatted.to_string(), "2");
    }

    #[test]
    fn truncates_sub_precision_dust() {
        // 10 integer digits leave room for 18 fractional digits.
        let raw = U256::from_str("12345678901234567890123456789").unwrap();
        let formatted = format_units(raw, 19).unwrap();
        assert_eq!(formatted, dec!(1234567890.123456789012345678));
    }

    #[test]
    fn rejects_values_too_large_for_decimal() {
        let err = format_units(U256::MAX, 0).unwrap_err();
        assert!(matches!(err, ToolError::Conversion(_)));
    }

    #[test]
    fn decimals_call_encodes_selector() {
        assert_eq!(hex::encode(decimalsCall {}.abi_encode()), "313ce567");
        let data = balanceOfCall {
            account: Address::ZERO,
        }
        .abi_encode();
        assert_eq!(hex::encode(&data[..4]), "70a08231");
        assert_eq!(data.len(), 36);
    }

    #[tokio::test]
    async fn unconfigured_network_is_reported() {
        let tool = GetNativeBalanceTool::new(Arc::new(NetworkPool::new()));
        let err = tool
            .call(NativeBalanceArgs {
                address: "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".into(),
                network: Network::Op,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NetworkUnavailable(Network::Op)));
    }

    #[tokio::test]
    async fn invalid_address_fails_before_any_rpc() {
        // The endpoint is never contacted: validation rejects the address first.
        let pool =
            NetworkPool::from_endpoints([(Network::Eth, "http://127.0.0.1:9")]).unwrap();
        let tool = GetErc20BalanceTool::new(Arc::new(pool));
        let err = tool
            .call(Erc20BalanceArgs {
                address: "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".into(),
                contract_address: "not-a-contract".into(),
                network: Network::Eth,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidAddress(a) if a == "not-a-contract"));
        assert!(!ToolError::InvalidAddress(String::new()).is_fatal());
    }
}
