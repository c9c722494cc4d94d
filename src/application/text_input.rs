//! Free-text handling
//!
//! Runs the dialogue state machine and performs the side effects of each
//! outcome: wallet creation, key import, withdrawal submission and token
//! lookups.

use super::bot::{BotService, EventContext};
use super::errors::{BotError, SELECT_WALLET_FIRST};
use crate::domain::dialogue::on_text;
use crate::domain::{short_address, Action, InputError, Session, TextOutcome, WaitingFor};
use crate::ports::{ChatError, MessageRef, OutboundMessage, WithdrawalRequest};

/// Menu a flow's errors return to
fn flow_menu(state: WaitingFor) -> Action {
    match state {
        WaitingFor::WalletCount | WaitingFor::ImportedKey => Action::Wallets,
        _ => Action::Withdraw,
    }
}

impl BotService {
    pub(super) async fn handle_text(
        &self,
        ctx: &EventContext,
        text: &str,
        message: MessageRef,
    ) -> Result<(), ChatError> {
        let mut session = self.sessions.lock(&ctx.user.id).await;
        let wallet_count = self.store.wallet_count(&ctx.user.id).await;
        let in_flow = session.waiting_for();

        let chain = &self.chain;
        let outcome = on_text(
            &mut session,
            text,
            wallet_count,
            &self.settings.rules,
            |address| chain.is_valid_address(address),
        );

        let back = match &outcome {
            TextOutcome::CreateWallets(_) | TextOutcome::ImportKey(_) => Action::Wallets,
            TextOutcome::Reprompt { state, .. } => flow_menu(*state),
            TextOutcome::TokenLookup(_) | TextOutcome::Ignored => Action::MainMenu,
            _ => Action::Withdraw,
        };

        let result = self
            .apply_outcome(ctx, &mut session, outcome, in_flow, message)
            .await;
        drop(session);
        self.report(ctx, result, &back).await
    }

    async fn apply_outcome(
        &self,
        ctx: &EventContext,
        session: &mut Session,
        outcome: TextOutcome,
        in_flow: Option<WaitingFor>,
        message: MessageRef,
    ) -> Result<(), BotError> {
        let user_id = ctx.user.id.as_str();

        match outcome {
            // a 0x-prefixed private key has the shape of a contract address
            TextOutcome::TokenLookup(_) if in_flow == Some(WaitingFor::ImportedKey) => {
                self.disclosure.erase_now(message).await;
                tracing::warn!(
                    "Discarded contract-address-shaped text from user {} at the key prompt",
                    user_id
                );
                self.send(
                    ctx,
                    self.views
                        .input_error(&InputError::InvalidKeyFormat, &Action::Wallets),
                )
                .await
            }

            TextOutcome::TokenLookup(address) => {
                if let Some(state) = in_flow {
                    tracing::warn!(
                        "Contract address from user {} taken as token lookup during {:?} step",
                        user_id,
                        state
                    );
                }
                session.last_token = Some(address.clone());
                self.lookup_token(ctx, session, &address).await
            }

            TextOutcome::Ignored => {
                tracing::debug!("Ignoring text from user {} outside any flow", user_id);
                Ok(())
            }

            TextOutcome::Reprompt { state, error } => {
                if state == WaitingFor::ImportedKey {
                    self.disclosure.erase_now(message).await;
                }
                self.send(ctx, self.views.input_error(&error, &flow_menu(state)))
                    .await
            }

            TextOutcome::CreateWallets(count) => {
                let wallets = (0..count)
                    .map(|_| self.store.generate_wallet())
                    .collect::<Result<Vec<_>, _>>()?;
                self.store.add_wallets(&ctx.user, wallets.clone()).await?;
                tracing::info!("User {} created {} wallets", user_id, count);

                self.disclosure
                    .disclose(ctx.chat_id, &self.views.batch_keys(&wallets))
                    .await?;
                self.send(ctx, self.views.batch_created()).await
            }

            TextOutcome::ImportKey(wallet) => {
                self.disclosure.erase_now(message).await;
                let index = self.store.add_wallet(&ctx.user, wallet.clone()).await?;
                tracing::info!("User {} imported wallet #{}", user_id, index);
                self.send(ctx, self.views.import_success(&wallet)).await
            }

            TextOutcome::AskWithdrawAddress { .. } | TextOutcome::AskTokenDestination { .. } => {
                self.send(ctx, self.views.ask_destination()).await
            }

            TextOutcome::AskTokenAmount { .. } => {
                self.send(ctx, self.views.ask_token_amount()).await
            }

            TextOutcome::Withdraw(intent) => {
                let wallet = self
                    .store
                    .wallet(user_id, intent.wallet_index)
                    .await
                    .ok_or_else(|| BotError::NotFound(SELECT_WALLET_FIRST.to_string()))?;

                let request = WithdrawalRequest {
                    user_id: user_id.to_string(),
                    from_address: wallet.address().to_string(),
                    asset: intent.asset,
                    amount: intent.amount,
                    destination: intent.destination,
                };
                let ticket = self.withdrawals.submit(request.clone()).await?;
                tracing::info!(
                    "Withdrawal {} submitted for user {} from {}",
                    ticket.id,
                    user_id,
                    wallet.short_address()
                );
                self.send(ctx, self.views.withdrawal_submitted(&request)).await
            }

            TextOutcome::StaleWallet => Err(BotError::NotFound(SELECT_WALLET_FIRST.to_string())),
        }
    }

    /// Loading message first, then replaced by the report or an error
    async fn lookup_token(
        &self,
        ctx: &EventContext,
        session: &Session,
        address: &str,
    ) -> Result<(), BotError> {
        let loading = self
            .transport
            .send_message(ctx.chat_id, &self.views.token_loading())
            .await?;
        let report = self.token_screen(&ctx.user.id, session, address).await;
        let loaded = EventContext {
            origin: Some(loading),
            ..ctx.clone()
        };
        self.render(&loaded, report).await
    }

    /// Token screen for `address`, or the lookup error screen
    pub(super) async fn token_screen(
        &self,
        user_id: &str,
        session: &Session,
        address: &str,
    ) -> OutboundMessage {
        match self.lookup.lookup(address).await {
            Ok(report) => {
                let settings = self.store.settings(user_id).await;
                let wallet_count = self.store.wallet_count(user_id).await;
                let has_trading_wallet = session
                    .selected_trading_wallet
                    .is_some_and(|index| index < wallet_count);
                self.views
                    .token_report(&report, &settings, has_trading_wallet)
            }
            Err(e) => {
                tracing::warn!("Token lookup failed for {}: {}", short_address(address), e);
                self.views.token_error()
            }
        }
    }
}
