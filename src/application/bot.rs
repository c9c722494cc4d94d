//! Bot Service
//!
//! Entry point for inbound chat events. Commands, free text and button
//! presses are routed to handlers that share one custody store and one
//! session registry. [`Dispatcher`] feeds events from an [`EventSource`],
//! serializing each user's events while users run in parallel.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::disclosure::SecretDisclosure;
use super::errors::{BotError, INVALID_SELECTION};
use super::sessions::SessionRegistry;
use super::token_lookup::TokenLookup;
use super::views::{Views, WalletLine};
use super::wallet_store::WalletCustodyStore;
use crate::config::Config;
use crate::domain::{
    Action, DialogueRules, Session, MAX_SLIPPAGE, MIN_SLIPPAGE,
};
use crate::ports::{
    ChainPort, ChatError, ChatId, ChatTransport, Clock, DeletionScheduler, EventSource,
    InboundEvent, MarketDataPort, MessageRef, OrderService, OutboundMessage, UserIdentity,
    WithdrawalPort,
};

/// External collaborators of the bot
pub struct BotPorts {
    pub transport: Arc<dyn ChatTransport>,
    pub chain: Arc<dyn ChainPort>,
    pub market: Arc<dyn MarketDataPort>,
    pub orders: Arc<dyn OrderService>,
    pub withdrawals: Arc<dyn WithdrawalPort>,
    pub scheduler: Arc<dyn DeletionScheduler>,
    pub clock: Arc<dyn Clock>,
}

/// Tunables taken from the config file
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub secret_ttl: Duration,
    pub rules: DialogueRules,
    pub min_slippage: f64,
    pub max_slippage: f64,
    pub native_symbol: String,
    pub network_name: String,
    pub explorer_url: String,
}

impl Default for BotSettings {
    fn default() -> Self {
        let views = Views::default();
        Self {
            secret_ttl: views.secret_ttl,
            rules: DialogueRules::default(),
            min_slippage: MIN_SLIPPAGE,
            max_slippage: MAX_SLIPPAGE,
            native_symbol: views.native_symbol,
            network_name: views.network_name,
            explorer_url: views.explorer_url,
        }
    }
}

impl From<&Config> for BotSettings {
    fn from(config: &Config) -> Self {
        Self {
            secret_ttl: Duration::from_secs(config.security.secret_ttl_secs),
            rules: DialogueRules {
                max_batch_wallets: config.security.max_batch_wallets,
            },
            min_slippage: config.trading.min_slippage,
            max_slippage: config.trading.max_slippage,
            native_symbol: config.chain.native_symbol.clone(),
            network_name: config.chain.network_name.clone(),
            explorer_url: config.chain.explorer_url.clone(),
        }
    }
}

/// Who an event came from and the message a button was attached to
#[derive(Debug, Clone)]
pub(super) struct EventContext {
    pub user: UserIdentity,
    pub chat_id: ChatId,
    pub origin: Option<MessageRef>,
}

pub struct BotService {
    pub(super) store: Arc<WalletCustodyStore>,
    pub(super) sessions: SessionRegistry,
    pub(super) transport: Arc<dyn ChatTransport>,
    pub(super) chain: Arc<dyn ChainPort>,
    pub(super) orders: Arc<dyn OrderService>,
    pub(super) withdrawals: Arc<dyn WithdrawalPort>,
    pub(super) disclosure: SecretDisclosure,
    pub(super) lookup: TokenLookup,
    pub(super) views: Views,
    pub(super) settings: BotSettings,
}

impl BotService {
    pub fn new(store: Arc<WalletCustodyStore>, ports: BotPorts, settings: BotSettings) -> Self {
        let views = Views {
            native_symbol: settings.native_symbol.clone(),
            network_name: settings.network_name.clone(),
            explorer_url: settings.explorer_url.clone(),
            secret_ttl: settings.secret_ttl,
            ..Views::default()
        };

        Self {
            store,
            sessions: SessionRegistry::new(),
            disclosure: SecretDisclosure::new(
                ports.transport.clone(),
                ports.scheduler,
                settings.secret_ttl,
            ),
            lookup: TokenLookup::new(ports.chain.clone(), ports.market, ports.clock),
            transport: ports.transport,
            chain: ports.chain,
            orders: ports.orders,
            withdrawals: ports.withdrawals,
            views,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<WalletCustodyStore> {
        &self.store
    }

    /// Copy of a user's conversation state
    pub async fn session(&self, user_id: &str) -> Session {
        self.sessions.snapshot(user_id).await
    }

    /// Handle one inbound event. User-facing failures are rendered to the
    /// chat; only transport failures are returned.
    pub async fn handle_event(&self, event: InboundEvent) -> Result<(), ChatError> {
        match event {
            InboundEvent::Command {
                from,
                chat_id,
                name,
            } => {
                let ctx = EventContext {
                    user: from,
                    chat_id,
                    origin: None,
                };
                let result = self.handle_command(&ctx, &name).await;
                self.report(&ctx, result, &Action::MainMenu).await
            }
            InboundEvent::Text {
                from,
                chat_id,
                text,
                message,
            } => {
                let ctx = EventContext {
                    user: from,
                    chat_id,
                    origin: None,
                };
                self.handle_text(&ctx, &text, message).await
            }
            InboundEvent::Button {
                from,
                chat_id,
                token,
                callback_id,
                message,
            } => {
                let ctx = EventContext {
                    user: from,
                    chat_id,
                    origin: message,
                };
                self.handle_button(&ctx, &token, &callback_id).await
            }
        }
    }

    async fn handle_command(&self, ctx: &EventContext, name: &str) -> Result<(), BotError> {
        match name {
            "start" | "menu" => self.start(ctx).await,
            other => {
                tracing::debug!("Ignoring unknown command /{} from {}", other, ctx.user.id);
                Ok(())
            }
        }
    }

    /// Welcome screen. A first-time user gets one wallet generated and its
    /// key disclosed first; a known user without wallets is sent to the
    /// wallet menu instead.
    async fn start(&self, ctx: &EventContext) -> Result<(), BotError> {
        let user_id = ctx.user.id.as_str();
        self.sessions.lock(user_id).await.reset();

        let new_user = !self.store.has_user(user_id).await;
        if new_user {
            let wallet = self.store.generate_wallet()?;
            self.store.add_wallet(&ctx.user, wallet.clone()).await?;
            tracing::info!("Generated first wallet for user {}", user_id);
            self.disclosure
                .disclose(ctx.chat_id, &self.views.generated_key(&wallet, true))
                .await?;
        }

        let Some(primary) = self.store.wallet(user_id, 0).await else {
            return self.send(ctx, self.views.wallets(&[])).await;
        };
        let balance = self.chain.get_native_balance(primary.address()).await.ok();

        self.send(ctx, self.views.welcome(&primary, balance, new_user))
            .await
    }

    async fn handle_button(
        &self,
        ctx: &EventContext,
        token: &str,
        callback_id: &str,
    ) -> Result<(), ChatError> {
        if let Err(e) = self.transport.acknowledge(callback_id).await {
            tracing::debug!("Callback {} not acknowledged: {}", callback_id, e);
        }

        let mut session = self.sessions.lock(&ctx.user.id).await;

        let action = match token.parse::<Action>() {
            Ok(action) => action,
            Err(e) => {
                tracing::debug!("Rejected button from {}: {}", ctx.user.id, e);
                session.take_confirmation();
                drop(session);
                let message = self.views.error(INVALID_SELECTION, &Action::MainMenu);
                return self.render(ctx, message).await.or_else(transport_only);
            }
        };

        tracing::debug!("User {} pressed {}", ctx.user.id, token);
        if action.resets_dialogue() {
            session.reset();
        }

        let result = self.route_action(ctx, &mut session, &action).await;
        drop(session);
        self.report(ctx, result, &action.owning_menu()).await
    }

    /// Render a handler error with a Back button; surface transport failures
    pub(super) async fn report(
        &self,
        ctx: &EventContext,
        result: Result<(), BotError>,
        back: &Action,
    ) -> Result<(), ChatError> {
        let err = match result {
            Ok(()) => return Ok(()),
            Err(BotError::Transport(e)) => return Err(e),
            Err(e) => e,
        };

        match &err {
            BotError::ExternalUnavailable(_) | BotError::PersistenceFailure(_) => {
                tracing::warn!("Request from user {} failed: {}", ctx.user.id, err)
            }
            _ => tracing::debug!("Request from user {} rejected: {}", ctx.user.id, err),
        }

        let message = self.views.error(err.user_message(), back);
        self.render(ctx, message).await.or_else(transport_only)
    }

    /// Replace the originating message, or send a new one
    pub(super) async fn render(
        &self,
        ctx: &EventContext,
        message: OutboundMessage,
    ) -> Result<(), BotError> {
        if let Some(origin) = ctx.origin {
            match self.transport.edit_message(origin, &message).await {
                Ok(()) => return Ok(()),
                Err(e) => tracing::debug!("Edit failed, sending instead: {}", e),
            }
        }
        self.send(ctx, message).await
    }

    pub(super) async fn send(
        &self,
        ctx: &EventContext,
        message: OutboundMessage,
    ) -> Result<(), BotError> {
        self.transport.send_message(ctx.chat_id, &message).await?;
        Ok(())
    }

    /// Wallets with their native balances; balances degrade to `None`
    pub(super) async fn wallet_lines(&self, user_id: &str) -> Vec<WalletLine> {
        let mut lines = Vec::new();
        for wallet in self.store.list_wallets(user_id).await {
            let balance = match self.chain.get_native_balance(wallet.address()).await {
                Ok(balance) => Some(balance),
                Err(e) => {
                    tracing::warn!("Balance unavailable for {}: {}", wallet.short_address(), e);
                    None
                }
            };
            lines.push((wallet, balance));
        }
        lines
    }
}

fn transport_only(err: BotError) -> Result<(), ChatError> {
    match err {
        BotError::Transport(e) => Err(e),
        _ => Ok(()),
    }
}

/// Fans events out to one worker task per user. A worker that sees no
/// events for `idle_timeout` exits and its entry is dropped on the next
/// batch; the user's next event starts a fresh worker.
pub struct Dispatcher {
    service: Arc<BotService>,
    workers: HashMap<String, (mpsc::UnboundedSender<InboundEvent>, JoinHandle<()>)>,
    retry_delay: Duration,
    idle_timeout: Duration,
}

impl Dispatcher {
    pub fn new(service: Arc<BotService>) -> Self {
        Self {
            service,
            workers: HashMap::new(),
            retry_delay: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(600),
        }
    }

    /// Pause after a failed poll
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Number of live per-user workers
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Poll `source` until `shutdown` resolves, then let every worker finish
    /// its queue. Returns the number of events dispatched.
    pub async fn run<S, F>(&mut self, mut source: S, shutdown: F) -> usize
    where
        S: EventSource,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut dispatched = 0;

        tracing::info!("Dispatcher started");
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, draining {} workers", self.workers.len());
                    break;
                }
                batch = source.next_batch() => match batch {
                    Ok(events) => {
                        self.reap_idle();
                        for event in events {
                            self.dispatch(event);
                            dispatched += 1;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("getUpdates failed: {}", e);
                        tokio::time::sleep(self.retry_delay).await;
                    }
                },
            }
        }

        self.drain().await;
        tracing::info!("Dispatcher stopped after {} events", dispatched);
        dispatched
    }

    fn dispatch(&mut self, event: InboundEvent) {
        let user_id = event.user().id.clone();

        let (event, previous) = match self.workers.remove(&user_id) {
            Some((queue, handle)) => match queue.send(event) {
                Ok(()) => {
                    self.workers.insert(user_id, (queue, handle));
                    return;
                }
                // worker went idle and closed its inbox
                Err(mpsc::error::SendError(event)) => (event, Some(handle)),
            },
            None => (event, None),
        };

        let (queue, mut inbox) = mpsc::unbounded_channel::<InboundEvent>();
        let service = Arc::clone(&self.service);
        let idle_timeout = self.idle_timeout;
        let worker_user = user_id.clone();
        let handle = tokio::spawn(async move {
            // the closing worker may still be answering its last events
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    tracing::error!("Worker for user {} panicked: {}", worker_user, e);
                }
            }

            loop {
                match tokio::time::timeout(idle_timeout, inbox.recv()).await {
                    Ok(Some(event)) => answer(&service, &worker_user, event).await,
                    Ok(None) => break,
                    Err(_) => {
                        inbox.close();
                        while let Some(event) = inbox.recv().await {
                            answer(&service, &worker_user, event).await;
                        }
                        tracing::debug!("Worker for user {} idle, exiting", worker_user);
                        break;
                    }
                }
            }
        });

        if queue.send(event).is_err() {
            tracing::warn!("Worker for user {} exited before its first event", user_id);
        }
        self.workers.insert(user_id, (queue, handle));
    }

    /// Forget workers that exited after going idle
    fn reap_idle(&mut self) {
        self.workers.retain(|_, (_, handle)| !handle.is_finished());
    }

    async fn drain(&mut self) {
        for (user_id, (queue, handle)) in self.workers.drain() {
            drop(queue);
            if let Err(e) = handle.await {
                tracing::error!("Worker for user {} panicked: {}", user_id, e);
            }
        }
    }
}

async fn answer(service: &BotService, user_id: &str, event: InboundEvent) {
    if let Err(e) = service.handle_event(event).await {
        tracing::warn!("Failed to answer user {}: {}", user_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::{
        FixedClock, ManualScheduler, MemoryStorage, MockChain, MockChat, MockMarketData,
        MockOrders, MockWithdrawals, ScriptedEvents,
    };

    async fn service(chat: Arc<MockChat>) -> Arc<BotService> {
        let clock = Arc::new(FixedClock::default());
        let store = WalletCustodyStore::open(Arc::new(MemoryStorage::new()), 10)
            .await
            .unwrap();
        let ports = BotPorts {
            transport: chat,
            chain: Arc::new(MockChain::new()),
            market: Arc::new(MockMarketData::new()),
            orders: Arc::new(MockOrders::new()),
            withdrawals: Arc::new(MockWithdrawals::new()),
            scheduler: Arc::new(ManualScheduler::new(clock.clone())),
            clock,
        };
        Arc::new(BotService::new(Arc::new(store), ports, BotSettings::default()))
    }

    fn user(id: &str) -> UserIdentity {
        UserIdentity {
            id: id.to_string(),
            username: None,
        }
    }

    fn command(id: &str, chat_id: ChatId) -> InboundEvent {
        InboundEvent::Command {
            from: user(id),
            chat_id,
            name: "start".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let chat = Arc::new(MockChat::new());
        let bot = service(chat.clone()).await;
        bot.handle_event(InboundEvent::Command {
            from: user("1"),
            chat_id: 1,
            name: "launch".to_string(),
        })
        .await
        .unwrap();
        assert!(chat.get_ops().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_button_is_invalid_selection() {
        let chat = Arc::new(MockChat::new());
        let bot = service(chat.clone()).await;
        bot.handle_event(InboundEvent::Button {
            from: user("1"),
            chat_id: 1,
            token: "confirm_delete_x".to_string(),
            callback_id: "cb".to_string(),
            message: None,
        })
        .await
        .unwrap();

        assert_eq!(chat.last_text(), INVALID_SELECTION);
        assert_eq!(bot.store().user_count().await, 0);
    }

    #[tokio::test]
    async fn test_dispatcher_runs_every_user_and_drains() {
        let chat = Arc::new(MockChat::new());
        let bot = service(chat.clone()).await;
        let source = ScriptedEvents::new(vec![
            vec![command("1", 11), command("2", 22)],
            vec![command("1", 11)],
        ]);

        let mut dispatcher = Dispatcher::new(bot.clone());
        let dispatched = dispatcher
            .run(source, tokio::time::sleep(Duration::from_millis(100)))
            .await;

        assert_eq!(dispatched, 3);
        assert_eq!(bot.store().user_count().await, 2);
        assert_eq!(bot.store().total_wallets().await, 2);

        let welcomes = chat
            .sent()
            .into_iter()
            .filter(|(_, m)| m.text.starts_with("Welcome to Monad Sniper Bot!"))
            .count();
        assert_eq!(welcomes, 3);
    }

    #[tokio::test]
    async fn test_idle_workers_are_reaped_and_restarted() {
        let chat = Arc::new(MockChat::new());
        let bot = service(chat.clone()).await;
        let mut dispatcher =
            Dispatcher::new(bot.clone()).with_idle_timeout(Duration::from_millis(20));

        dispatcher.dispatch(command("1", 11));
        assert_eq!(dispatcher.worker_count(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        dispatcher.reap_idle();
        assert_eq!(dispatcher.worker_count(), 0);

        dispatcher.dispatch(command("1", 11));
        dispatcher.drain().await;

        assert_eq!(bot.store().user_count().await, 1);
        let welcomes = chat
            .sent()
            .into_iter()
            .filter(|(_, m)| m.text.starts_with("Welcome to Monad Sniper Bot!"))
            .count();
        assert_eq!(welcomes, 2);
    }
}
