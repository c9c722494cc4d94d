use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::WithdrawAsset;

/// Withdrawal error type
#[derive(Error, Debug)]
pub enum WithdrawalError {
    #[error("Withdrawal rejected: {0}")]
    Rejected(String),

    #[error("Withdrawal backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub user_id: String,
    pub from_address: String,
    pub asset: WithdrawAsset,
    pub amount: Decimal,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalTicket {
    pub id: String,
}

/// Sink for completed withdrawal flows
#[async_trait]
pub trait WithdrawalPort: Send + Sync {
    async fn submit(&self, request: WithdrawalRequest) -> Result<WithdrawalTicket, WithdrawalError>;
}
