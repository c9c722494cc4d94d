//! Domain Layer - Core custody and conversation logic
//!
//! This module contains pure domain types and logic with no I/O.
//! All external interactions happen through the ports layer.
//!
//! ## Modules
//!
//! - `wallet`: secp256k1 key pairs and address derivation
//! - `address`: address validation, checksums and the contract-address heuristic
//! - `user`: user records and settings
//! - `order`: orders as exposed by the order service
//! - `session`: per-user conversation state
//! - `dialogue`: free-text transitions of the conversation state machine
//! - `action`: typed callback actions parsed from button tokens
//! - `pager`: order list pagination

pub mod action;
pub mod address;
pub mod dialogue;
pub mod order;
pub mod pager;
pub mod session;
pub mod user;
pub mod wallet;

pub use action::{Action, ActionParseError};
pub use address::{is_valid_address, looks_like_contract_address, short_address};
pub use dialogue::{DialogueRules, InputError, TextOutcome, WithdrawAsset, WithdrawalIntent};
pub use order::{Order, OrderSide, OrderStatus};
pub use pager::{page, Page, DEFAULT_PAGE_SIZE};
pub use session::{ConfirmKind, FlowInput, OrderList, PendingConfirmation, Session, WaitingFor};
pub use user::{GasTier, Settings, User, DEFAULT_SLIPPAGE, MAX_SLIPPAGE, MIN_SLIPPAGE};
pub use wallet::{Wallet, WalletError};
