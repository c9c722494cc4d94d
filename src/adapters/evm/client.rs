//! EVM JSON-RPC Client
//!
//! Reads ERC-20 metadata with `eth_call`, native balances with
//! `eth_getBalance` and runtime bytecode with `eth_getCode`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::abi::{self, AbiError};
use crate::domain::address;
use crate::ports::{ChainError, ChainPort, ContractCapabilities, ContractMetadata};

/// Native token decimals on EVM chains
const NATIVE_DECIMALS: u32 = 18;

const MINT_SIGNATURES: &[&str] = &["mint(address,uint256)", "mint(uint256)"];
const BLACKLIST_SIGNATURES: &[&str] = &[
    "blacklist(address)",
    "addToBlacklist(address)",
    "setBlacklist(address,bool)",
    "addBlackList(address)",
];
const UPGRADE_SIGNATURES: &[&str] = &["upgradeTo(address)", "upgradeToAndCall(address,bytes)"];

/// Errors from the JSON-RPC layer
#[derive(Debug, Error)]
pub enum EvmRpcError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("ABI decoding failed: {0}")]
    Abi(#[from] AbiError),
}

impl From<EvmRpcError> for ChainError {
    fn from(e: EvmRpcError) -> Self {
        ChainError::Rpc(e.to_string())
    }
}

/// Configuration for the EvmRpcClient
#[derive(Debug, Clone)]
pub struct EvmRpcConfig {
    /// JSON-RPC endpoint URL
    pub rpc_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for EvmRpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://testnet-rpc.monad.xyz".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl EvmRpcConfig {
    pub fn with_rpc_url(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC client for an EVM chain
#[derive(Debug)]
pub struct EvmRpcClient {
    config: EvmRpcConfig,
    http: Client,
    request_id: AtomicU64,
}

impl EvmRpcClient {
    pub fn with_config(config: EvmRpcConfig) -> Result<Self, EvmRpcError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            http,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.config.rpc_url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, EvmRpcError> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": self.request_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.config.rpc_url)
            .json(&request_body)
            .send()
            .await?;

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| EvmRpcError::ParseError(format!("Failed to parse JSON: {}", e)))?;

        if let Some(error) = body.error {
            return Err(EvmRpcError::RpcError {
                code: error.code,
                message: error.message,
            });
        }
        body.result
            .ok_or_else(|| EvmRpcError::ParseError("No result in response".into()))
    }

    async fn call_hex(&self, method: &str, params: Value) -> Result<Vec<u8>, EvmRpcError> {
        let result = self.call(method, params).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| EvmRpcError::ParseError(format!("{} result is not a string", method)))?;
        abi::decode_hex(raw).map_err(|e| EvmRpcError::ParseError(e.to_string()))
    }

    /// `eth_call` a zero-argument view function at latest block
    async fn eth_call(&self, to: &str, signature: &str) -> Result<Vec<u8>, EvmRpcError> {
        self.call_hex(
            "eth_call",
            json!([{ "to": to, "data": abi::calldata(signature) }, "latest"]),
        )
        .await
    }

    async fn fetch_metadata(&self, address: &str) -> Result<ContractMetadata, EvmRpcError> {
        let (name, symbol, decimals, total_supply) = tokio::try_join!(
            self.eth_call(address, "name()"),
            self.eth_call(address, "symbol()"),
            self.eth_call(address, "decimals()"),
            self.eth_call(address, "totalSupply()"),
        )?;

        Ok(ContractMetadata {
            name: abi::decode_string(&name)?,
            symbol: abi::decode_string(&symbol)?,
            decimals: abi::decode_u8(&decimals)?,
            total_supply: abi::decode_u128(&total_supply)?,
        })
    }
}

/// Which privileged functions the dispatcher table exposes
pub fn scan_capabilities(code: &[u8]) -> ContractCapabilities {
    let selectors = abi::push4_selectors(code);
    let has_any = |signatures: &[&str]| {
        signatures
            .iter()
            .any(|sig| selectors.contains(&abi::selector(sig)))
    };

    ContractCapabilities {
        mintable: has_any(MINT_SIGNATURES),
        blacklist: has_any(BLACKLIST_SIGNATURES),
        upgradeable: has_any(UPGRADE_SIGNATURES),
    }
}

/// Convert a wei amount into whole native units
pub fn wei_to_native(wei: u128) -> Option<Decimal> {
    let wei = i128::try_from(wei).ok()?;
    Decimal::try_from_i128_with_scale(wei, NATIVE_DECIMALS)
        .ok()
        .map(|d| d.normalize())
}

#[async_trait]
impl ChainPort for EvmRpcClient {
    fn is_valid_address(&self, address: &str) -> bool {
        address::is_valid_address(address)
    }

    async fn get_contract_metadata(&self, address: &str) -> Result<ContractMetadata, ChainError> {
        self.fetch_metadata(address).await.map_err(|e| {
            tracing::debug!(
                "Contract metadata lookup failed for {}: {}",
                address::short_address(address),
                e
            );
            ChainError::ContractUnavailable(e.to_string())
        })
    }

    async fn get_contract_capabilities(
        &self,
        address: &str,
    ) -> Result<ContractCapabilities, ChainError> {
        let code = self
            .call_hex("eth_getCode", json!([address, "latest"]))
            .await
            .map_err(|e| ChainError::ContractUnavailable(e.to_string()))?;

        if code.is_empty() {
            return Err(ChainError::ContractUnavailable(format!(
                "no contract code at {}",
                address::short_address(address)
            )));
        }
        Ok(scan_capabilities(&code))
    }

    async fn get_native_balance(&self, address: &str) -> Result<Decimal, ChainError> {
        if !address::is_valid_address(address) {
            return Err(ChainError::InvalidAddress(address.to_string()));
        }

        let raw = self
            .call_hex("eth_getBalance", json!([address, "latest"]))
            .await?;
        if raw.len() > 16 {
            return Err(ChainError::Rpc("balance exceeds u128".to_string()));
        }

        let mut buf = [0u8; 16];
        buf[16 - raw.len()..].copy_from_slice(&raw);
        wei_to_native(u128::from_be_bytes(buf))
            .ok_or_else(|| ChainError::Rpc("balance out of decimal range".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_config_default() {
        let config = EvmRpcConfig::default();
        assert_eq!(config.rpc_url, "https://testnet-rpc.monad.xyz");
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_client_with_custom_url() {
        let client = EvmRpcClient::with_config(EvmRpcConfig::with_rpc_url("http://localhost:8545"))
            .unwrap();
        assert_eq!(client.rpc_url(), "http://localhost:8545");
    }

    #[test]
    fn test_wei_conversion() {
        assert_eq!(wei_to_native(1_500_000_000_000_000_000), Some(dec!(1.5)));
        assert_eq!(wei_to_native(1), Some(dec!(0.000000000000000001)));
        assert_eq!(wei_to_native(0), Some(Decimal::ZERO));
    }

    #[test]
    fn test_scan_capabilities() {
        let mint = abi::selector("mint(address,uint256)");
        let upgrade = abi::selector("upgradeTo(address)");
        let mut code = vec![0x63];
        code.extend_from_slice(&mint);
        code.push(0x63);
        code.extend_from_slice(&upgrade);
        code.push(0x00);

        let caps = scan_capabilities(&code);
        assert!(caps.mintable);
        assert!(caps.upgradeable);
        assert!(!caps.blacklist);
    }

    #[test]
    fn test_scan_plain_token() {
        let transfer = abi::selector("transfer(address,uint256)");
        let mut code = vec![0x63];
        code.extend_from_slice(&transfer);
        code.push(0x00);
        assert_eq!(scan_capabilities(&code), ContractCapabilities::default());
    }
}
