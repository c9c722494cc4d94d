//! EVM Adapter
//!
//! Implements [`ChainPort`](crate::ports::ChainPort) over plain JSON-RPC:
//! - ERC-20 metadata via `eth_call` (name, symbol, decimals, totalSupply)
//! - Native balances via `eth_getBalance`
//! - Privileged-function detection by scanning `eth_getCode` bytecode

pub mod abi;
mod client;

pub use client::{scan_capabilities, wei_to_native, EvmRpcClient, EvmRpcConfig, EvmRpcError};
