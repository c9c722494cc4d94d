//! Withdrawal queue
//!
//! Completed withdrawal flows are queued and logged for an operator or a
//! downstream signer. Nothing is broadcast from here.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::{short_address, WithdrawAsset};
use crate::ports::{WithdrawalError, WithdrawalPort, WithdrawalRequest, WithdrawalTicket};

#[derive(Debug, Default)]
pub struct QueuedWithdrawals {
    queue: Mutex<Vec<(WithdrawalTicket, WithdrawalRequest)>>,
    counter: AtomicU64,
}

impl QueuedWithdrawals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything submitted so far
    pub async fn pending(&self) -> Vec<(WithdrawalTicket, WithdrawalRequest)> {
        self.queue.lock().await.clone()
    }
}

#[async_trait]
impl WithdrawalPort for QueuedWithdrawals {
    async fn submit(&self, request: WithdrawalRequest) -> Result<WithdrawalTicket, WithdrawalError> {
        let bare = |a: &str| a.strip_prefix("0x").unwrap_or(a).to_ascii_lowercase();
        if bare(&request.from_address) == bare(&request.destination) {
            return Err(WithdrawalError::Rejected(
                "destination is the source wallet".to_string(),
            ));
        }

        let seq = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let ticket = WithdrawalTicket {
            id: format!("wd-{}-{}", Utc::now().format("%Y%m%d%H%M%S"), seq),
        };

        let asset = match &request.asset {
            WithdrawAsset::Native => "native".to_string(),
            WithdrawAsset::Token(token) => format!("token {}", short_address(token)),
        };
        tracing::info!(
            "Queued withdrawal {}: {} {} from {} to {} (user {})",
            ticket.id,
            request.amount,
            asset,
            short_address(&request.from_address),
            short_address(&request.destination),
            request.user_id
        );

        self.queue.lock().await.push((ticket.clone(), request));
        Ok(ticket)
    }
}
