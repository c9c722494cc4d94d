//! Session State
//!
//! Process-lifetime, per-user conversation state: the waiting-for marker,
//! partially collected flow input, the confirmation gate and cached UI state.
//! Never persisted.

use rust_decimal::Decimal;

/// Which free-text input the bot is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitingFor {
    WalletCount,
    ImportedKey,
    WithdrawAmount,
    WithdrawAddress,
    TokenAddress,
    TokenAmount,
    TokenDestination,
}

/// Partial input collected by the withdrawal flows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowInput {
    pub selected_wallet: Option<usize>,
    pub withdraw_amount: Option<Decimal>,
    pub token_address: Option<String>,
    pub token_amount: Option<Decimal>,
}

impl FlowInput {
    pub fn is_empty(&self) -> bool {
        *self == FlowInput::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    DeleteWallet,
    ShowKey,
}

/// An armed confirmation gate awaiting its execute step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub kind: ConfirmKind,
    pub wallet_index: usize,
}

/// Paged order lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderList {
    Active,
    History,
    Cancel,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    waiting_for: Option<WaitingFor>,
    input: FlowInput,
    pending_confirmation: Option<PendingConfirmation>,
    active_page: usize,
    history_page: usize,
    cancel_page: usize,
    pub selected_trading_wallet: Option<usize>,
    /// Contract address of the last token lookup
    pub last_token: Option<String>,
}

impl Session {
    pub fn waiting_for(&self) -> Option<WaitingFor> {
        self.waiting_for
    }

    pub fn input(&self) -> &FlowInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut FlowInput {
        &mut self.input
    }

    pub fn is_idle(&self) -> bool {
        self.waiting_for.is_none()
    }

    /// Enter a flow. Collected amounts and addresses are discarded; the
    /// selected wallet is kept since it is picked before the flow starts.
    pub fn begin(&mut self, state: WaitingFor) {
        let selected_wallet = self.input.selected_wallet;
        self.input = FlowInput {
            selected_wallet,
            ..FlowInput::default()
        };
        self.waiting_for = Some(state);
    }

    /// Move to the next step of the current flow
    pub fn advance(&mut self, state: WaitingFor) {
        self.waiting_for = Some(state);
    }

    /// Flow completed: back to idle with no residual input
    pub fn finish(&mut self) {
        self.waiting_for = None;
        self.input = FlowInput::default();
    }

    /// Back navigation: drop the flow and any armed confirmation
    pub fn reset(&mut self) {
        self.finish();
        self.pending_confirmation = None;
    }

    /// Pick the withdrawal source wallet, abandoning any flow in progress
    pub fn select_wallet(&mut self, index: usize) {
        self.finish();
        self.input.selected_wallet = Some(index);
    }

    pub fn request_confirmation(&mut self, kind: ConfirmKind, wallet_index: usize) {
        self.pending_confirmation = Some(PendingConfirmation { kind, wallet_index });
    }

    /// Disarm the gate, returning what was pending
    pub fn take_confirmation(&mut self) -> Option<PendingConfirmation> {
        self.pending_confirmation.take()
    }

    pub fn pending_confirmation(&self) -> Option<PendingConfirmation> {
        self.pending_confirmation
    }

    pub fn page(&self, list: OrderList) -> usize {
        match list {
            OrderList::Active => self.active_page,
            OrderList::History => self.history_page,
            OrderList::Cancel => self.cancel_page,
        }
    }

    pub fn set_page(&mut self, list: OrderList, page: usize) {
        match list {
            OrderList::Active => self.active_page = page,
            OrderList::History => self.history_page = page,
            OrderList::Cancel => self.cancel_page = page,
        }
    }

    /// Keep cached wallet indices pointing at the same wallets after a removal
    pub fn on_wallet_removed(&mut self, index: usize) {
        self.selected_trading_wallet = shift_after_removal(self.selected_trading_wallet, index);

        if self.input.selected_wallet == Some(index) {
            self.finish();
        } else {
            self.input.selected_wallet = shift_after_removal(self.input.selected_wallet, index);
        }
    }
}

fn shift_after_removal(selected: Option<usize>, removed: usize) -> Option<usize> {
    match selected {
        Some(i) if i == removed => None,
        Some(i) if i > removed => Some(i - 1),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::default();
        assert!(session.is_idle());
        assert!(session.input().is_empty());
        assert!(session.pending_confirmation().is_none());
    }

    #[test]
    fn test_begin_keeps_selected_wallet() {
        let mut session = Session::default();
        session.select_wallet(2);
        session.input_mut().withdraw_amount = Some(dec!(1));
        session.begin(WaitingFor::WithdrawAmount);

        assert_eq!(session.waiting_for(), Some(WaitingFor::WithdrawAmount));
        assert_eq!(session.input().selected_wallet, Some(2));
        assert!(session.input().withdraw_amount.is_none());
    }

    #[test]
    fn test_finish_clears_everything() {
        let mut session = Session::default();
        session.select_wallet(0);
        session.begin(WaitingFor::TokenAddress);
        session.input_mut().token_address = Some("abc".into());
        session.advance(WaitingFor::TokenAmount);

        session.finish();
        assert!(session.is_idle());
        assert!(session.input().is_empty());
    }

    #[test]
    fn test_reset_disarms_gate() {
        let mut session = Session::default();
        session.request_confirmation(ConfirmKind::DeleteWallet, 1);
        session.begin(WaitingFor::WalletCount);

        session.reset();
        assert!(session.is_idle());
        assert!(session.pending_confirmation().is_none());
    }

    #[test]
    fn test_take_confirmation_is_one_shot() {
        let mut session = Session::default();
        session.request_confirmation(ConfirmKind::ShowKey, 0);

        let pending = session.take_confirmation();
        assert_eq!(
            pending,
            Some(PendingConfirmation {
                kind: ConfirmKind::ShowKey,
                wallet_index: 0
            })
        );
        assert!(session.take_confirmation().is_none());
    }

    #[test]
    fn test_pages_are_tracked_per_list() {
        let mut session = Session::default();
        session.set_page(OrderList::Active, 2);
        session.set_page(OrderList::Cancel, 1);
        assert_eq!(session.page(OrderList::Active), 2);
        assert_eq!(session.page(OrderList::History), 0);
        assert_eq!(session.page(OrderList::Cancel), 1);
    }

    #[test]
    fn test_wallet_removal_shifts_cached_indices() {
        let mut session = Session::default();
        session.selected_trading_wallet = Some(3);
        session.select_wallet(2);
        session.on_wallet_removed(1);
        assert_eq!(session.selected_trading_wallet, Some(2));
        assert_eq!(session.input().selected_wallet, Some(1));

        session.on_wallet_removed(2);
        assert_eq!(session.selected_trading_wallet, None);
    }

    #[test]
    fn test_removing_selected_withdraw_wallet_abandons_flow() {
        let mut session = Session::default();
        session.select_wallet(0);
        session.begin(WaitingFor::WithdrawAmount);

        session.on_wallet_removed(0);
        assert!(session.is_idle());
        assert!(session.input().selected_wallet.is_none());
    }
}
