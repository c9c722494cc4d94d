//! Hand-written recording mocks for every port.
//!
//! Public so integration tests can drive the whole bot without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use super::chain::{ChainError, ChainPort, ContractCapabilities, ContractMetadata};
use super::chat::{
    ChatError, ChatId, ChatTransport, EventSource, InboundEvent, MessageRef, OutboundMessage,
};
use super::market_data::{MarketDataPort, PairLpInfo, SocialLinks, TokenMarketInfo};
use super::orders::{OrderService, OrderServiceError};
use super::scheduler::{Clock, DeletionScheduler, ScheduledDeletion};
use super::storage::{StorageError, UserMap, UserStorage};
use super::withdrawal::{WithdrawalError, WithdrawalPort, WithdrawalRequest, WithdrawalTicket};
use crate::domain::{address, Order, OrderStatus};

/// One recorded transport operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOp {
    Sent {
        target: MessageRef,
        message: OutboundMessage,
    },
    Edited {
        target: MessageRef,
        message: OutboundMessage,
    },
    Deleted(MessageRef),
    Acknowledged(String),
}

/// Mock chat transport that records every operation
#[derive(Debug, Default)]
pub struct MockChat {
    ops: Arc<Mutex<Vec<ChatOp>>>,
    next_message_id: AtomicI64,
    fail_deletes: AtomicBool,
}

impl MockChat {
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicI64::new(100),
            ..Self::default()
        }
    }

    /// Builder method to make every delete fail
    pub fn with_failing_deletes(self) -> Self {
        self.fail_deletes.store(true, Ordering::SeqCst);
        self
    }

    pub fn get_ops(&self) -> Vec<ChatOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Messages sent or edited, in order
    pub fn rendered(&self) -> Vec<OutboundMessage> {
        self.get_ops()
            .into_iter()
            .filter_map(|op| match op {
                ChatOp::Sent { message, .. } | ChatOp::Edited { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn sent(&self) -> Vec<(MessageRef, OutboundMessage)> {
        self.get_ops()
            .into_iter()
            .filter_map(|op| match op {
                ChatOp::Sent { target, message } => Some((target, message)),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageRef> {
        self.get_ops()
            .into_iter()
            .filter_map(|op| match op {
                ChatOp::Deleted(target) => Some(target),
                _ => None,
            })
            .collect()
    }

    pub fn last_rendered(&self) -> Option<OutboundMessage> {
        self.rendered().pop()
    }

    pub fn last_text(&self) -> String {
        self.last_rendered().map(|m| m.text).unwrap_or_default()
    }

    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChatTransport for MockChat {
    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<MessageRef, ChatError> {
        let target = MessageRef {
            chat_id,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
        };
        self.ops.lock().unwrap().push(ChatOp::Sent {
            target,
            message: message.clone(),
        });
        Ok(target)
    }

    async fn edit_message(
        &self,
        target: MessageRef,
        message: &OutboundMessage,
    ) -> Result<(), ChatError> {
        self.ops.lock().unwrap().push(ChatOp::Edited {
            target,
            message: message.clone(),
        });
        Ok(())
    }

    async fn delete_message(&self, target: MessageRef) -> Result<(), ChatError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ChatError::Api {
                code: 400,
                description: "message to delete not found".to_string(),
            });
        }
        self.ops.lock().unwrap().push(ChatOp::Deleted(target));
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), ChatError> {
        self.ops
            .lock()
            .unwrap()
            .push(ChatOp::Acknowledged(callback_id.to_string()));
        Ok(())
    }
}

/// Mock chain with canned contracts and balances
#[derive(Debug, Default)]
pub struct MockChain {
    contracts: Arc<Mutex<HashMap<String, (ContractMetadata, ContractCapabilities)>>>,
    balances: Arc<Mutex<HashMap<String, Decimal>>>,
    calls: Arc<Mutex<Vec<String>>>,
    rpc_down: AtomicBool,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register a contract (address compared case-insensitively)
    pub fn with_contract(
        self,
        address: &str,
        metadata: ContractMetadata,
        capabilities: ContractCapabilities,
    ) -> Self {
        self.contracts
            .lock()
            .unwrap()
            .insert(address.to_ascii_lowercase(), (metadata, capabilities));
        self
    }

    pub fn with_balance(self, address: &str, balance: Decimal) -> Self {
        self.balances
            .lock()
            .unwrap()
            .insert(address.to_ascii_lowercase(), balance);
        self
    }

    /// Builder method to make balance queries fail
    pub fn with_rpc_down(self) -> Self {
        self.rpc_down.store(true, Ordering::SeqCst);
        self
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainPort for MockChain {
    fn is_valid_address(&self, address: &str) -> bool {
        address::is_valid_address(address)
    }

    async fn get_contract_metadata(&self, address: &str) -> Result<ContractMetadata, ChainError> {
        self.calls.lock().unwrap().push(format!("metadata:{}", address));
        self.contracts
            .lock()
            .unwrap()
            .get(&address.to_ascii_lowercase())
            .map(|(metadata, _)| metadata.clone())
            .ok_or_else(|| ChainError::ContractUnavailable(address.to_string()))
    }

    async fn get_contract_capabilities(
        &self,
        address: &str,
    ) -> Result<ContractCapabilities, ChainError> {
        self.contracts
            .lock()
            .unwrap()
            .get(&address.to_ascii_lowercase())
            .map(|(_, capabilities)| *capabilities)
            .ok_or_else(|| ChainError::ContractUnavailable(address.to_string()))
    }

    async fn get_native_balance(&self, address: &str) -> Result<Decimal, ChainError> {
        if self.rpc_down.load(Ordering::SeqCst) {
            return Err(ChainError::Rpc("connection refused".to_string()));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address.to_ascii_lowercase())
            .copied()
            .unwrap_or(Decimal::ZERO))
    }
}

/// Mock market data returning the same canned values for every token
#[derive(Debug, Default)]
pub struct MockMarketData {
    market: TokenMarketInfo,
    lp: PairLpInfo,
    socials: Option<SocialLinks>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_market(mut self, market: TokenMarketInfo) -> Self {
        self.market = market;
        self
    }

    pub fn with_lp(mut self, lp: PairLpInfo) -> Self {
        self.lp = lp;
        self
    }

    pub fn with_socials(mut self, socials: SocialLinks) -> Self {
        self.socials = Some(socials);
        self
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn get_token_market_info(&self, address: &str) -> TokenMarketInfo {
        self.calls.lock().unwrap().push(format!("market:{}", address));
        self.market.clone()
    }

    async fn get_pair_lp_info(&self, address: &str) -> PairLpInfo {
        self.calls.lock().unwrap().push(format!("lp:{}", address));
        self.lp.clone()
    }

    async fn get_social_links(&self, address: &str) -> Option<SocialLinks> {
        self.calls.lock().unwrap().push(format!("social:{}", address));
        self.socials.clone()
    }
}

/// In-memory storage that counts saves and can be told to fail
#[derive(Debug, Default)]
pub struct MemoryStorage {
    saved: Arc<Mutex<UserMap>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(self, users: UserMap) -> Self {
        *self.saved.lock().unwrap() = users;
        self
    }

    /// Toggle save failures at runtime
    pub fn set_failing(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Last successfully saved snapshot
    pub fn snapshot(&self) -> UserMap {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStorage for MemoryStorage {
    async fn load(&self) -> Result<UserMap, StorageError> {
        Ok(self.snapshot())
    }

    async fn save(&self, users: &UserMap) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io("disk full".to_string()));
        }
        *self.saved.lock().unwrap() = users.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock order service over canned lists
#[derive(Debug, Default)]
pub struct MockOrders {
    active: Arc<Mutex<Vec<Order>>>,
    history: Arc<Mutex<Vec<Order>>>,
    cancelled: Arc<Mutex<Vec<String>>>,
}

impl MockOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active(self, orders: Vec<Order>) -> Self {
        *self.active.lock().unwrap() = orders;
        self
    }

    pub fn with_history(self, orders: Vec<Order>) -> Self {
        *self.history.lock().unwrap() = orders;
        self
    }

    pub fn get_cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderService for MockOrders {
    async fn active_orders(&self, _user_id: &str) -> Result<Vec<Order>, OrderServiceError> {
        Ok(self.active.lock().unwrap().clone())
    }

    async fn order_history(&self, _user_id: &str) -> Result<Vec<Order>, OrderServiceError> {
        Ok(self.history.lock().unwrap().clone())
    }

    async fn cancel_order(&self, _user_id: &str, order_id: &str) -> Result<Order, OrderServiceError> {
        let mut active = self.active.lock().unwrap();
        let position = active
            .iter()
            .position(|o| o.id == order_id)
            .ok_or_else(|| OrderServiceError::NotFound(order_id.to_string()))?;

        let mut order = active.remove(position);
        order.status = OrderStatus::Cancelled;
        self.history.lock().unwrap().push(order.clone());
        self.cancelled.lock().unwrap().push(order_id.to_string());
        Ok(order)
    }
}

/// Mock withdrawal sink that records requests
#[derive(Debug, Default)]
pub struct MockWithdrawals {
    requests: Arc<Mutex<Vec<WithdrawalRequest>>>,
}

impl MockWithdrawals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_requests(&self) -> Vec<WithdrawalRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl WithdrawalPort for MockWithdrawals {
    async fn submit(&self, request: WithdrawalRequest) -> Result<WithdrawalTicket, WithdrawalError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);
        Ok(WithdrawalTicket {
            id: format!("wd-{}", requests.len()),
        })
    }
}

/// Clock frozen at a settable instant
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Scheduler that records deletions instead of running timers
pub struct ManualScheduler {
    clock: Arc<dyn Clock>,
    scheduled: Mutex<Vec<ScheduledDeletion>>,
    cancelled: Mutex<Vec<ScheduledDeletion>>,
    next_id: AtomicU64,
}

impl ManualScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            scheduled: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Every deletion ever scheduled, including cancelled ones
    pub fn scheduled(&self) -> Vec<ScheduledDeletion> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<ScheduledDeletion> {
        self.cancelled.lock().unwrap().clone()
    }

    /// Scheduled, not cancelled, and due at `now`
    pub fn due(&self, now: DateTime<Utc>) -> Vec<ScheduledDeletion> {
        let cancelled = self.cancelled();
        self.scheduled()
            .into_iter()
            .filter(|d| d.due_at <= now && !cancelled.contains(d))
            .collect()
    }
}

impl DeletionScheduler for ManualScheduler {
    fn schedule_deletion(&self, target: MessageRef, delay: Duration) -> ScheduledDeletion {
        let deletion = ScheduledDeletion {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            target,
            due_at: self.clock.now() + chrono::Duration::from_std(delay).unwrap(),
        };
        self.scheduled.lock().unwrap().push(deletion);
        deletion
    }

    fn cancel(&self, target: MessageRef) -> bool {
        let cancelled = self.cancelled();
        let pending = self
            .scheduled()
            .into_iter()
            .find(|d| d.target == target && !cancelled.contains(d));
        match pending {
            Some(deletion) => {
                self.cancelled.lock().unwrap().push(deletion);
                true
            }
            None => false,
        }
    }

    fn pending(&self) -> usize {
        let cancelled = self.cancelled();
        self.scheduled()
            .iter()
            .filter(|d| !cancelled.contains(d))
            .count()
    }
}

/// Event source replaying canned batches, then idling forever
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    batches: VecDeque<Vec<InboundEvent>>,
}

impl ScriptedEvents {
    pub fn new(batches: Vec<Vec<InboundEvent>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }
}

#[async_trait]
impl EventSource for ScriptedEvents {
    async fn next_batch(&mut self) -> Result<Vec<InboundEvent>, ChatError> {
        match self.batches.pop_front() {
            Some(batch) => Ok(batch),
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_chat_records_operations() {
        let chat = MockChat::new();
        let first = chat
            .send_message(1, &OutboundMessage::plain("hello"))
            .await
            .unwrap();
        let second = chat
            .send_message(1, &OutboundMessage::plain("again"))
            .await
            .unwrap();
        assert_ne!(first, second);

        chat.edit_message(first, &OutboundMessage::plain("edited"))
            .await
            .unwrap();
        chat.delete_message(second).await.unwrap();

        assert_eq!(chat.rendered().len(), 3);
        assert_eq!(chat.last_text(), "edited");
        assert_eq!(chat.deleted(), vec![second]);
    }

    #[tokio::test]
    async fn test_memory_storage_failure_keeps_snapshot() {
        let storage = MemoryStorage::new();
        let mut users = UserMap::new();
        users.insert("1".into(), crate::domain::User::new(None));
        storage.save(&users).await.unwrap();

        storage.set_failing(true);
        assert!(storage.save(&UserMap::new()).await.is_err());
        assert_eq!(storage.snapshot().len(), 1);
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn test_manual_scheduler_due_and_cancel() {
        let clock = Arc::new(FixedClock::default());
        let scheduler = ManualScheduler::new(clock.clone());
        let target = MessageRef {
            chat_id: 1,
            message_id: 10,
        };

        let deletion = scheduler.schedule_deletion(target, Duration::from_secs(60));
        assert_eq!(deletion.due_at - clock.now(), chrono::Duration::seconds(60));
        assert!(scheduler.due(clock.now()).is_empty());

        clock.advance(Duration::from_secs(60));
        assert_eq!(scheduler.due(clock.now()), vec![deletion]);

        assert!(scheduler.cancel(target));
        assert!(!scheduler.cancel(target));
        assert_eq!(scheduler.pending(), 0);
    }
}
