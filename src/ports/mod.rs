//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - The chat transport (send/edit/delete, inbound events)
//! - Blockchain reads (address checks, contract metadata, balances)
//! - Market data (prices, LP data, socials)
//! - Durable user storage
//! - Order read/cancel and withdrawal submission
//! - Deferred deletion and time

pub mod chain;
pub mod chat;
pub mod market_data;
pub mod mocks;
pub mod orders;
pub mod scheduler;
pub mod storage;
pub mod withdrawal;

// Re-export main traits and types
pub use chain::{ChainError, ChainPort, ContractCapabilities, ContractMetadata};
pub use chat::{
    Button, ChatError, ChatId, ChatTransport, EventSource, InboundEvent, Keyboard, MessageRef,
    OutboundMessage, UserIdentity,
};
pub use market_data::{MarketDataPort, PairLpInfo, SocialLinks, TokenMarketInfo};
pub use orders::{OrderService, OrderServiceError};
pub use scheduler::{Clock, DeletionScheduler, ScheduledDeletion};
pub use storage::{StorageError, UserMap, UserStorage};
pub use withdrawal::{WithdrawalError, WithdrawalPort, WithdrawalRequest, WithdrawalTicket};
