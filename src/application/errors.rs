//! Bot error taxonomy
//!
//! Every failure a handler can hit is folded into [`BotError`]. Each variant
//! carries the short text shown to the user; the router adds a single Back
//! button to the owning menu.

use thiserror::Error;

use super::wallet_store::StoreError;
use crate::domain::WalletError;
use crate::ports::{ChainError, ChatError, OrderServiceError, WithdrawalError};

pub const INVALID_SELECTION: &str = "❌ Invalid selection.";
pub const NEED_WALLET_FIRST: &str = "You need to create or import a wallet first!";
pub const SELECT_WALLET_FIRST: &str = "Please select a wallet first.";
pub const ORDER_NOT_FOUND: &str = "Error: Order not found.";

#[derive(Debug, Error)]
pub enum BotError {
    /// Bad button argument or rejected value; nothing changed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Referenced wallet, order or user does not exist
    #[error("not found: {0}")]
    NotFound(String),

    #[error("external service unavailable: {0}")]
    ExternalUnavailable(String),

    /// The store could not be flushed; the mutation was rolled back
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("transport error: {0}")]
    Transport(#[from] ChatError),
}

impl BotError {
    pub fn invalid_selection() -> Self {
        BotError::InvalidInput(INVALID_SELECTION.to_string())
    }

    /// Text shown to the user
    pub fn user_message(&self) -> String {
        match self {
            BotError::InvalidInput(message) | BotError::NotFound(message) => message.clone(),
            BotError::ExternalUnavailable(_) => {
                "❌ A network service is unavailable right now. Please try again later."
                    .to_string()
            }
            BotError::PersistenceFailure(_) => {
                "❌ Could not save your changes. Nothing was changed, please try again.".to_string()
            }
            BotError::Transport(_) => "❌ Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<StoreError> for BotError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::IndexOutOfRange { .. } => BotError::invalid_selection(),
            StoreError::UnknownUser(_) => BotError::NotFound(NEED_WALLET_FIRST.to_string()),
            limit @ StoreError::WalletLimitReached(_) => {
                BotError::InvalidInput(format!("❌ {}", limit))
            }
            StoreError::Wallet(WalletError::InvalidKeyFormat(_)) => BotError::InvalidInput(
                "❌ Invalid private key. Please try again or go back.".to_string(),
            ),
            StoreError::Wallet(WalletError::EntropyFailure(reason)) => {
                BotError::ExternalUnavailable(reason)
            }
            StoreError::Persistence(inner) => BotError::PersistenceFailure(inner.to_string()),
        }
    }
}

impl From<ChainError> for BotError {
    fn from(e: ChainError) -> Self {
        BotError::ExternalUnavailable(e.to_string())
    }
}

impl From<OrderServiceError> for BotError {
    fn from(e: OrderServiceError) -> Self {
        match e {
            OrderServiceError::NotFound(_) => BotError::NotFound(ORDER_NOT_FOUND.to_string()),
            OrderServiceError::NotCancellable(_) => {
                BotError::InvalidInput("❌ This order can no longer be cancelled.".to_string())
            }
            OrderServiceError::Unavailable(reason) => BotError::ExternalUnavailable(reason),
        }
    }
}

impl From<WithdrawalError> for BotError {
    fn from(e: WithdrawalError) -> Self {
        match e {
            WithdrawalError::Rejected(reason) => {
                BotError::InvalidInput(format!("❌ Withdrawal rejected: {}", reason))
            }
            WithdrawalError::Unavailable(reason) => BotError::ExternalUnavailable(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::StorageError;

    #[test]
    fn test_index_out_of_range_is_invalid_selection() {
        let err = BotError::from(StoreError::IndexOutOfRange { index: 3, len: 2 });
        assert_eq!(err.user_message(), INVALID_SELECTION);
    }

    #[test]
    fn test_wallet_limit_message() {
        let err = BotError::from(StoreError::WalletLimitReached(10));
        assert_eq!(
            err.user_message(),
            "❌ Maximum of 10 wallets allowed per user"
        );
    }

    #[test]
    fn test_persistence_failure_says_nothing_changed() {
        let err = BotError::from(StoreError::Persistence(StorageError::Io("disk full".into())));
        assert!(matches!(err, BotError::PersistenceFailure(_)));
        assert!(err.user_message().contains("Nothing was changed"));
        assert!(!err.user_message().contains("disk full"));
    }

    #[test]
    fn test_order_errors() {
        let err = BotError::from(OrderServiceError::NotFound("abc".into()));
        assert_eq!(err.user_message(), ORDER_NOT_FOUND);

        let err = BotError::from(OrderServiceError::Unavailable("timeout".into()));
        assert!(matches!(err, BotError::ExternalUnavailable(_)));
    }

    #[test]
    fn test_withdrawal_rejection_is_shown() {
        let err = BotError::from(WithdrawalError::Rejected("destination is the source wallet".into()));
        assert!(err.user_message().contains("destination is the source wallet"));
    }
}
