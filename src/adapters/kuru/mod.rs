//! Kuru Market Data Adapter
//!
//! Implements [`MarketDataPort`](crate::ports::MarketDataPort) against the
//! Kuru DEX REST API:
//! - `/v1/tokens/{address}`: price, liquidity, pair creation time
//! - `/v1/pairs/{address}`: LP supply, burned LP, reserves
//! - `/v1/tokens/{address}/social`: website / telegram / twitter / discord

mod client;
mod types;

pub use client::{KuruClient, KuruConfig, KuruError};
