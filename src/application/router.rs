//! Callback routing
//!
//! One handler per [`Action`]. The confirmation gate is disarmed on every
//! button press; an execute action only runs when the gate it consumed was
//! armed for the same kind and wallet.

use super::bot::{BotService, EventContext};
use super::errors::{BotError, NEED_WALLET_FIRST, ORDER_NOT_FOUND, SELECT_WALLET_FIRST};
use crate::domain::{
    page, Action, ConfirmKind, GasTier, Order, OrderList, PendingConfirmation, Session,
    WaitingFor, DEFAULT_PAGE_SIZE,
};

impl BotService {
    pub(super) async fn route_action(
        &self,
        ctx: &EventContext,
        session: &mut Session,
        action: &Action,
    ) -> Result<(), BotError> {
        let gate = session.take_confirmation();
        let user_id = ctx.user.id.as_str();

        match action {
            Action::MainMenu => self.render(ctx, self.views.main_menu()).await,

            // ---- wallets ----
            Action::Wallets => {
                let lines = self.wallet_lines(user_id).await;
                self.render(ctx, self.views.wallets(&lines)).await
            }
            Action::NewWallet => {
                let wallet = self.store.generate_wallet()?;
                let index = self.store.add_wallet(&ctx.user, wallet.clone()).await?;
                tracing::info!("User {} created wallet #{}", user_id, index);

                self.disclosure
                    .disclose(ctx.chat_id, &self.views.generated_key(&wallet, false))
                    .await?;
                let lines = self.wallet_lines(user_id).await;
                self.send(ctx, self.views.wallets(&lines)).await
            }
            Action::NewWallets => {
                session.begin(WaitingFor::WalletCount);
                let max = self.settings.rules.max_batch_wallets;
                self.render(ctx, self.views.ask_wallet_count(max)).await
            }
            Action::ImportWallet => {
                session.begin(WaitingFor::ImportedKey);
                self.render(ctx, self.views.ask_private_key()).await
            }
            Action::DeleteWallet => {
                let wallets = self.store.list_wallets(user_id).await;
                if wallets.is_empty() {
                    return Err(BotError::NotFound(
                        "You don't have any wallets to delete.".to_string(),
                    ));
                }
                self.render(ctx, self.views.select_wallet_to_delete(&wallets))
                    .await
            }
            Action::ConfirmDelete(index) => {
                let wallet = self
                    .store
                    .wallet(user_id, *index)
                    .await
                    .ok_or_else(BotError::invalid_selection)?;
                session.request_confirmation(ConfirmKind::DeleteWallet, *index);
                self.render(ctx, self.views.confirm_delete(&wallet, *index))
                    .await
            }
            Action::ExecuteDelete(index) => {
                require_gate(gate, ConfirmKind::DeleteWallet, *index)?;
                let removed = self.store.remove_wallet(user_id, *index).await?;
                session.on_wallet_removed(*index);
                tracing::info!("User {} deleted wallet #{}", user_id, index);
                self.render(ctx, self.views.wallet_deleted(&removed)).await
            }
            Action::ShowPrivateKey => {
                let wallets = self.store.list_wallets(user_id).await;
                if wallets.is_empty() {
                    return Err(BotError::NotFound(NEED_WALLET_FIRST.to_string()));
                }
                self.render(ctx, self.views.select_wallet_to_show(&wallets))
                    .await
            }
            Action::ConfirmShowKey(index) => {
                let wallet = self
                    .store
                    .wallet(user_id, *index)
                    .await
                    .ok_or_else(BotError::invalid_selection)?;
                session.request_confirmation(ConfirmKind::ShowKey, *index);
                self.render(ctx, self.views.confirm_show_key(&wallet, *index))
                    .await
            }
            Action::ExecuteShowKey(index) => {
                require_gate(gate, ConfirmKind::ShowKey, *index)?;
                let wallet = self
                    .store
                    .wallet(user_id, *index)
                    .await
                    .ok_or_else(BotError::invalid_selection)?;
                self.disclosure
                    .disclose(ctx.chat_id, &self.views.shown_key(&wallet))
                    .await?;
                tracing::info!("User {} viewed key of wallet #{}", user_id, index);
                self.render(ctx, self.views.key_sent_notice()).await
            }

            // ---- withdrawals ----
            Action::Withdraw => {
                let wallets = self.store.list_wallets(user_id).await;
                if wallets.is_empty() {
                    return Err(BotError::NotFound(NEED_WALLET_FIRST.to_string()));
                }
                session.reset();
                self.render(ctx, self.views.withdraw_menu(&wallets)).await
            }
            Action::SelectWithdrawWallet(index) => {
                let wallet = self
                    .store
                    .wallet(user_id, *index)
                    .await
                    .ok_or_else(BotError::invalid_selection)?;
                session.select_wallet(*index);
                self.render(ctx, self.views.withdraw_options(&wallet)).await
            }
            Action::WithdrawNative => {
                self.require_withdraw_wallet(user_id, session).await?;
                session.begin(WaitingFor::WithdrawAmount);
                self.render(ctx, self.views.ask_withdraw_amount()).await
            }
            Action::WithdrawToken => {
                self.require_withdraw_wallet(user_id, session).await?;
                session.begin(WaitingFor::TokenAddress);
                self.render(ctx, self.views.ask_token_address()).await
            }

            // ---- orders ----
            Action::ManageOrders => self.render(ctx, self.views.manage_orders()).await,
            Action::ActiveOrders => self.show_orders(ctx, session, OrderList::Active, 0).await,
            Action::OrderHistory => self.show_orders(ctx, session, OrderList::History, 0).await,
            Action::CancelOrders => self.show_orders(ctx, session, OrderList::Cancel, 0).await,
            Action::OrdersPage { list, page } => {
                self.show_orders(ctx, session, *list, *page).await
            }
            Action::ViewActiveOrder(index) => {
                let order = self.order_at(user_id, OrderList::Active, *index).await?;
                self.render(ctx, self.views.order_details(&order, &Action::ActiveOrders))
                    .await
            }
            Action::ViewHistoryOrder(index) => {
                let order = self.order_at(user_id, OrderList::History, *index).await?;
                self.render(ctx, self.views.order_details(&order, &Action::OrderHistory))
                    .await
            }
            Action::CancelOrder(index) => {
                let order = self.order_at(user_id, OrderList::Cancel, *index).await?;
                self.cancel_order(ctx, &order.id).await
            }
            Action::ConfirmCancelOrder(order_id) => self.cancel_order(ctx, order_id).await,

            // ---- token screen ----
            Action::TokenInfo => self.refresh_token_screen(ctx, session).await,
            Action::SelectTradingWallet => {
                let lines = self.wallet_lines(user_id).await;
                if lines.is_empty() {
                    return Err(BotError::NotFound(NEED_WALLET_FIRST.to_string()));
                }
                self.render(ctx, self.views.trading_wallet_picker(&lines))
                    .await
            }
            Action::SelectTradeWallet(index) => {
                if *index >= self.store.wallet_count(user_id).await {
                    return Err(BotError::invalid_selection());
                }
                session.selected_trading_wallet = Some(*index);
                self.refresh_token_screen(ctx, session).await
            }
            Action::SetSlippage => self.render(ctx, self.views.slippage_menu()).await,
            Action::SlippagePreset(value) => {
                let value = *value;
                if !(self.settings.min_slippage..=self.settings.max_slippage).contains(&value) {
                    return Err(BotError::invalid_selection());
                }
                self.store
                    .update_settings(user_id, |s| s.slippage = value)
                    .await?;
                tracing::info!("User {} set slippage to {}%", user_id, value);
                self.refresh_token_screen(ctx, session).await
            }
            Action::CustomSlippage => {
                self.render(
                    ctx,
                    self.views.not_available("Custom slippage", &Action::SetSlippage),
                )
                .await
            }
            Action::SetGas => self.render(ctx, self.views.gas_menu()).await,
            Action::GasPreset(price) => {
                let tier =
                    GasTier::from_gas_price(*price).ok_or_else(BotError::invalid_selection)?;
                self.store
                    .update_settings(user_id, |s| s.gas_tier = tier)
                    .await?;
                tracing::info!("User {} set gas tier to {}", user_id, tier.label());
                self.refresh_token_screen(ctx, session).await
            }
            Action::CustomGas => {
                self.render(ctx, self.views.not_available("Custom gas", &Action::SetGas))
                    .await
            }
            Action::Buy | Action::Sell | Action::LimitOrder => {
                if session.last_token.is_none() {
                    return self.render(ctx, self.views.token_prompt()).await;
                }
                self.render(ctx, self.views.not_available("Trading", &Action::TokenInfo))
                    .await
            }
            Action::Chart => {
                self.render(ctx, self.views.not_available("Charting", &Action::TokenInfo))
                    .await
            }
            Action::Explorer => match &session.last_token {
                Some(token) => self.render(ctx, self.views.explorer_link(token)).await,
                None => self.render(ctx, self.views.token_prompt()).await,
            },

            // ---- informational ----
            Action::Config => {
                let settings = self.store.settings(user_id).await;
                self.render(ctx, self.views.config(&settings)).await
            }
            Action::Referral => self.render(ctx, self.views.referral()).await,
            Action::Portfolio => self.render(ctx, self.views.portfolio()).await,
            Action::Guide => self.render(ctx, self.views.guide()).await,
        }
    }

    /// The withdrawal source must still exist
    async fn require_withdraw_wallet(
        &self,
        user_id: &str,
        session: &mut Session,
    ) -> Result<usize, BotError> {
        let count = self.store.wallet_count(user_id).await;
        match session.input().selected_wallet {
            Some(index) if index < count => Ok(index),
            _ => {
                session.reset();
                Err(BotError::NotFound(SELECT_WALLET_FIRST.to_string()))
            }
        }
    }

    async fn load_orders(&self, user_id: &str, list: OrderList) -> Result<Vec<Order>, BotError> {
        let orders = match list {
            OrderList::Active | OrderList::Cancel => self.orders.active_orders(user_id).await?,
            OrderList::History => self.orders.order_history(user_id).await?,
        };
        Ok(orders)
    }

    async fn show_orders(
        &self,
        ctx: &EventContext,
        session: &mut Session,
        list: OrderList,
        requested: usize,
    ) -> Result<(), BotError> {
        let orders = self.load_orders(&ctx.user.id, list).await?;
        let shown = page(&orders, requested, DEFAULT_PAGE_SIZE);
        session.set_page(list, shown.index);
        self.render(ctx, self.views.order_list(list, &shown)).await
    }

    async fn order_at(
        &self,
        user_id: &str,
        list: OrderList,
        index: usize,
    ) -> Result<Order, BotError> {
        self.load_orders(user_id, list)
            .await?
            .into_iter()
            .nth(index)
            .ok_or_else(|| BotError::NotFound(ORDER_NOT_FOUND.to_string()))
    }

    async fn cancel_order(&self, ctx: &EventContext, order_id: &str) -> Result<(), BotError> {
        let order = self.orders.cancel_order(&ctx.user.id, order_id).await?;
        tracing::info!("User {} cancelled order {}", ctx.user.id, order.short_id());
        self.render(ctx, self.views.order_cancelled(&order)).await
    }

    /// Re-render the token screen for the last looked-up token
    async fn refresh_token_screen(
        &self,
        ctx: &EventContext,
        session: &Session,
    ) -> Result<(), BotError> {
        let Some(token) = session.last_token.clone() else {
            return self.render(ctx, self.views.token_prompt()).await;
        };
        let message = self.token_screen(&ctx.user.id, session, &token).await;
        self.render(ctx, message).await
    }
}

fn require_gate(
    gate: Option<PendingConfirmation>,
    kind: ConfirmKind,
    wallet_index: usize,
) -> Result<(), BotError> {
    match gate {
        Some(pending) if pending == (PendingConfirmation { kind, wallet_index }) => Ok(()),
        _ => Err(BotError::invalid_selection()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_must_match_kind_and_index() {
        let armed = Some(PendingConfirmation {
            kind: ConfirmKind::DeleteWallet,
            wallet_index: 2,
        });
        assert!(require_gate(armed, ConfirmKind::DeleteWallet, 2).is_ok());
        assert!(require_gate(armed, ConfirmKind::DeleteWallet, 1).is_err());
        assert!(require_gate(armed, ConfirmKind::ShowKey, 2).is_err());
        assert!(require_gate(None, ConfirmKind::DeleteWallet, 2).is_err());
    }
}
