//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Telegram: Bot API transport and long polling
//! - EVM: Monad JSON-RPC reads (metadata, balances, bytecode)
//! - Kuru: DEX market data REST client
//! - Storage: JSON user store with sealed private keys
//! - Orders / Withdrawal: in-process order book and withdrawal queue
//! - Scheduler: tokio-backed deferred message deletion
//! - CLI: Command-line interface definitions

pub mod cli;
pub mod evm;
pub mod kuru;
pub mod orders;
pub mod scheduler;
pub mod storage;
pub mod telegram;
pub mod withdrawal;

pub use cli::CliApp;
pub use evm::{EvmRpcClient, EvmRpcConfig};
pub use kuru::{KuruClient, KuruConfig};
pub use orders::InMemoryOrderBook;
pub use scheduler::{SystemClock, TokioDeletionScheduler};
pub use storage::{JsonFileStore, KeyVault};
pub use telegram::{TelegramClient, TelegramConfig};
pub use withdrawal::QueuedWithdrawals;
