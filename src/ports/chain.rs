use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Blockchain error type
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Contract unavailable: {0}")]
    ContractUnavailable(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// ERC-20 style metadata read from a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u128,
}

/// Privileged functions detected in contract bytecode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContractCapabilities {
    pub mintable: bool,
    pub blacklist: bool,
    pub upgradeable: bool,
}

/// Blockchain port trait
#[async_trait]
pub trait ChainPort: Send + Sync {
    /// Address checker used by every address-collecting step
    fn is_valid_address(&self, address: &str) -> bool;

    /// name / symbol / decimals / totalSupply; `ContractUnavailable` on any failure
    async fn get_contract_metadata(&self, address: &str) -> Result<ContractMetadata, ChainError>;

    async fn get_contract_capabilities(
        &self,
        address: &str,
    ) -> Result<ContractCapabilities, ChainError>;

    /// Native balance in whole units
    async fn get_native_balance(&self, address: &str) -> Result<Decimal, ChainError>;
}
