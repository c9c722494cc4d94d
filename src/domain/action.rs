//! Callback Actions
//!
//! Button presses arrive as opaque tokens. They are parsed once at the
//! transport boundary into a typed [`Action`]; handlers never see strings.
//!
//! Parsing is ordered and first-match-wins: exact tokens, then prefix tokens
//! carrying a trailing argument. A prefix that extends another prefix
//! (`cancel_page_` vs `cancel_`) is listed first.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::session::OrderList;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionParseError {
    #[error("unknown action token: {0}")]
    Unknown(String),
    #[error("invalid argument in action token {token}")]
    InvalidArgument { token: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MainMenu,

    // wallets
    Wallets,
    NewWallet,
    NewWallets,
    ImportWallet,
    DeleteWallet,
    ConfirmDelete(usize),
    ExecuteDelete(usize),
    ShowPrivateKey,
    ConfirmShowKey(usize),
    ExecuteShowKey(usize),

    // withdrawals
    Withdraw,
    SelectWithdrawWallet(usize),
    WithdrawNative,
    WithdrawToken,

    // orders
    ManageOrders,
    ActiveOrders,
    OrderHistory,
    CancelOrders,
    OrdersPage { list: OrderList, page: usize },
    ViewActiveOrder(usize),
    ViewHistoryOrder(usize),
    CancelOrder(usize),
    ConfirmCancelOrder(String),

    // token screen
    TokenInfo,
    SelectTradingWallet,
    SelectTradeWallet(usize),
    SetSlippage,
    SlippagePreset(f64),
    CustomSlippage,
    SetGas,
    GasPreset(u64),
    CustomGas,
    Buy,
    Sell,
    LimitOrder,
    Chart,
    Explorer,

    // informational
    Config,
    Referral,
    Portfolio,
    Guide,
}

#[derive(Debug, Clone, Copy)]
enum PrefixKind {
    SelectTradeWallet,
    SelectWithdrawWallet,
    SlippagePreset,
    GasPreset,
    Page(OrderList),
    ViewActiveOrder,
    ViewHistoryOrder,
    ConfirmCancelOrder,
    CancelOrder,
    ConfirmDelete,
    ExecuteDelete,
    ConfirmShowKey,
    ExecuteShowKey,
}

/// Prefix tokens in match order. No entry may start with an earlier entry.
const PREFIXES: &[(&str, PrefixKind)] = &[
    ("select_trade_wallet_", PrefixKind::SelectTradeWallet),
    ("select_wallet_withdraw_", PrefixKind::SelectWithdrawWallet),
    ("set_slippage_", PrefixKind::SlippagePreset),
    ("set_gas_", PrefixKind::GasPreset),
    ("view_active_page_", PrefixKind::Page(OrderList::Active)),
    ("view_active_", PrefixKind::ViewActiveOrder),
    ("view_history_page_", PrefixKind::Page(OrderList::History)),
    ("view_history_", PrefixKind::ViewHistoryOrder),
    ("confirm_cancel_", PrefixKind::ConfirmCancelOrder),
    ("cancel_page_", PrefixKind::Page(OrderList::Cancel)),
    ("cancel_", PrefixKind::CancelOrder),
    ("confirm_delete_", PrefixKind::ConfirmDelete),
    ("execute_delete_", PrefixKind::ExecuteDelete),
    ("confirm_show_key_", PrefixKind::ConfirmShowKey),
    ("execute_show_key_", PrefixKind::ExecuteShowKey),
];

fn parse_exact(token: &str) -> Option<Action> {
    let action = match token {
        "main_menu" => Action::MainMenu,
        "wallets" => Action::Wallets,
        "new_wallet" => Action::NewWallet,
        "new_x_wallets" => Action::NewWallets,
        "import_wallet" => Action::ImportWallet,
        "delete_wallet" => Action::DeleteWallet,
        "show_private_key" => Action::ShowPrivateKey,
        "withdraw" => Action::Withdraw,
        "withdraw_mon" => Action::WithdrawNative,
        "withdraw_tokens" => Action::WithdrawToken,
        "manage_orders" => Action::ManageOrders,
        "active_orders" => Action::ActiveOrders,
        "order_history" => Action::OrderHistory,
        "cancel_orders" => Action::CancelOrders,
        "token_info" => Action::TokenInfo,
        "select_trading_wallet" => Action::SelectTradingWallet,
        "set_slippage" => Action::SetSlippage,
        "set_slippage_custom" => Action::CustomSlippage,
        "set_gas" => Action::SetGas,
        "set_gas_custom" => Action::CustomGas,
        "buy_token" => Action::Buy,
        "sell_token" => Action::Sell,
        "limit_order" => Action::LimitOrder,
        "show_chart" => Action::Chart,
        "sui_vision" => Action::Explorer,
        "config" => Action::Config,
        "referral" => Action::Referral,
        "portfolio" => Action::Portfolio,
        "guide" => Action::Guide,
        _ => return None,
    };
    Some(action)
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if let Some(action) = parse_exact(token) {
            return Ok(action);
        }

        let (prefix, kind) = PREFIXES
            .iter()
            .find(|(prefix, _)| token.starts_with(prefix))
            .ok_or_else(|| ActionParseError::Unknown(token.to_string()))?;

        let arg = &token[prefix.len()..];
        let invalid = || ActionParseError::InvalidArgument {
            token: token.to_string(),
        };
        let index = || arg.parse::<usize>().map_err(|_| invalid());

        let action = match kind {
            PrefixKind::SelectTradeWallet => Action::SelectTradeWallet(index()?),
            PrefixKind::SelectWithdrawWallet => Action::SelectWithdrawWallet(index()?),
            PrefixKind::SlippagePreset => {
                let value = arg.parse::<f64>().map_err(|_| invalid())?;
                if !value.is_finite() {
                    return Err(invalid());
                }
                Action::SlippagePreset(value)
            }
            PrefixKind::GasPreset => Action::GasPreset(arg.parse::<u64>().map_err(|_| invalid())?),
            PrefixKind::Page(list) => Action::OrdersPage {
                list: *list,
                page: index()?,
            },
            PrefixKind::ViewActiveOrder => Action::ViewActiveOrder(index()?),
            PrefixKind::ViewHistoryOrder => Action::ViewHistoryOrder(index()?),
            PrefixKind::ConfirmCancelOrder => {
                if arg.is_empty() {
                    return Err(invalid());
                }
                Action::ConfirmCancelOrder(arg.to_string())
            }
            PrefixKind::CancelOrder => Action::CancelOrder(index()?),
            PrefixKind::ConfirmDelete => Action::ConfirmDelete(index()?),
            PrefixKind::ExecuteDelete => Action::ExecuteDelete(index()?),
            PrefixKind::ConfirmShowKey => Action::ConfirmShowKey(index()?),
            PrefixKind::ExecuteShowKey => Action::ExecuteShowKey(index()?),
        };
        Ok(action)
    }
}

impl Action {
    /// Navigation that counts as "Back": any flow in progress is discarded.
    /// `Withdraw` also resets, but only once it is known the user has a
    /// wallet to withdraw from.
    pub fn resets_dialogue(&self) -> bool {
        matches!(self, Action::MainMenu | Action::Wallets | Action::ManageOrders)
    }

    /// Menu an error raised by this action returns to
    pub fn owning_menu(&self) -> Action {
        match self {
            Action::NewWallet
            | Action::NewWallets
            | Action::ImportWallet
            | Action::DeleteWallet
            | Action::ShowPrivateKey
            | Action::ConfirmDelete(_)
            | Action::ExecuteDelete(_)
            | Action::ConfirmShowKey(_)
            | Action::ExecuteShowKey(_) => Action::Wallets,

            Action::SelectWithdrawWallet(_) | Action::WithdrawNative | Action::WithdrawToken => {
                Action::Withdraw
            }

            Action::ActiveOrders | Action::OrderHistory | Action::CancelOrders => {
                Action::ManageOrders
            }
            Action::OrdersPage { list, .. } => Action::order_list(*list),
            Action::ViewActiveOrder(_) | Action::ConfirmCancelOrder(_) => Action::ActiveOrders,
            Action::ViewHistoryOrder(_) => Action::OrderHistory,
            Action::CancelOrder(_) => Action::CancelOrders,

            Action::SelectTradingWallet
            | Action::SelectTradeWallet(_)
            | Action::SetSlippage
            | Action::SlippagePreset(_)
            | Action::CustomSlippage
            | Action::SetGas
            | Action::GasPreset(_)
            | Action::CustomGas
            | Action::Buy
            | Action::Sell
            | Action::LimitOrder
            | Action::Chart
            | Action::Explorer => Action::TokenInfo,

            Action::MainMenu
            | Action::Wallets
            | Action::Withdraw
            | Action::ManageOrders
            | Action::TokenInfo
            | Action::Config
            | Action::Referral
            | Action::Portfolio
            | Action::Guide => Action::MainMenu,
        }
    }

    /// Menu action that renders a given order list
    pub fn order_list(list: OrderList) -> Action {
        match list {
            OrderList::Active => Action::ActiveOrders,
            OrderList::History => Action::OrderHistory,
            OrderList::Cancel => Action::CancelOrders,
        }
    }
}

fn page_prefix(list: OrderList) -> &'static str {
    match list {
        OrderList::Active => "view_active_page_",
        OrderList::History => "view_history_page_",
        OrderList::Cancel => "cancel_page_",
    }
}

/// Token encoding, the inverse of [`FromStr`]
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::MainMenu => write!(f, "main_menu"),
            Action::Wallets => write!(f, "wallets"),
            Action::NewWallet => write!(f, "new_wallet"),
            Action::NewWallets => write!(f, "new_x_wallets"),
            Action::ImportWallet => write!(f, "import_wallet"),
            Action::DeleteWallet => write!(f, "delete_wallet"),
            Action::ConfirmDelete(i) => write!(f, "confirm_delete_{}", i),
            Action::ExecuteDelete(i) => write!(f, "execute_delete_{}", i),
            Action::ShowPrivateKey => write!(f, "show_private_key"),
            Action::ConfirmShowKey(i) => write!(f, "confirm_show_key_{}", i),
            Action::ExecuteShowKey(i) => write!(f, "execute_show_key_{}", i),
            Action::Withdraw => write!(f, "withdraw"),
            Action::SelectWithdrawWallet(i) => write!(f, "select_wallet_withdraw_{}", i),
            Action::WithdrawNative => write!(f, "withdraw_mon"),
            Action::WithdrawToken => write!(f, "withdraw_tokens"),
            Action::ManageOrders => write!(f, "manage_orders"),
            Action::ActiveOrders => write!(f, "active_orders"),
            Action::OrderHistory => write!(f, "order_history"),
            Action::CancelOrders => write!(f, "cancel_orders"),
            Action::OrdersPage { list, page } => write!(f, "{}{}", page_prefix(*list), page),
            Action::ViewActiveOrder(i) => write!(f, "view_active_{}", i),
            Action::ViewHistoryOrder(i) => write!(f, "view_history_{}", i),
            Action::CancelOrder(i) => write!(f, "cancel_{}", i),
            Action::ConfirmCancelOrder(id) => write!(f, "confirm_cancel_{}", id),
            Action::TokenInfo => write!(f, "token_info"),
            Action::SelectTradingWallet => write!(f, "select_trading_wallet"),
            Action::SelectTradeWallet(i) => write!(f, "select_trade_wallet_{}", i),
            Action::SetSlippage => write!(f, "set_slippage"),
            Action::SlippagePreset(value) => write!(f, "set_slippage_{}", value),
            Action::CustomSlippage => write!(f, "set_slippage_custom"),
            Action::SetGas => write!(f, "set_gas"),
            Action::GasPreset(price) => write!(f, "set_gas_{}", price),
            Action::CustomGas => write!(f, "set_gas_custom"),
            Action::Buy => write!(f, "buy_token"),
            Action::Sell => write!(f, "sell_token"),
            Action::LimitOrder => write!(f, "limit_order"),
            Action::Chart => write!(f, "show_chart"),
            Action::Explorer => write!(f, "sui_vision"),
            Action::Config => write!(f, "config"),
            Action::Referral => write!(f, "referral"),
            Action::Portfolio => write!(f, "portfolio"),
            Action::Guide => write!(f, "guide"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(token: &str) -> Result<Action, ActionParseError> {
        token.parse()
    }

    #[test]
    fn test_prefix_table_has_no_shadowing() {
        for (i, (earlier, _)) in PREFIXES.iter().enumerate() {
            for (later, _) in &PREFIXES[i + 1..] {
                assert!(
                    !later.starts_with(earlier),
                    "{} is shadowed by {}",
                    later,
                    earlier
                );
            }
        }
    }

    #[test]
    fn test_exact_tokens() {
        assert_eq!(parse("main_menu"), Ok(Action::MainMenu));
        assert_eq!(parse("new_x_wallets"), Ok(Action::NewWallets));
        assert_eq!(parse("withdraw_mon"), Ok(Action::WithdrawNative));
        assert_eq!(parse("cancel_orders"), Ok(Action::CancelOrders));
        assert_eq!(parse("set_slippage_custom"), Ok(Action::CustomSlippage));
        assert_eq!(parse("set_gas_custom"), Ok(Action::CustomGas));
    }

    #[test]
    fn test_more_specific_prefix_wins() {
        assert_eq!(
            parse("cancel_page_2"),
            Ok(Action::OrdersPage {
                list: OrderList::Cancel,
                page: 2
            })
        );
        assert_eq!(parse("cancel_3"), Ok(Action::CancelOrder(3)));
        assert_eq!(
            parse("view_active_page_1"),
            Ok(Action::OrdersPage {
                list: OrderList::Active,
                page: 1
            })
        );
        assert_eq!(parse("view_active_4"), Ok(Action::ViewActiveOrder(4)));
        assert_eq!(
            parse("confirm_cancel_ab12cd"),
            Ok(Action::ConfirmCancelOrder("ab12cd".to_string()))
        );
    }

    #[test]
    fn test_indexed_tokens() {
        assert_eq!(parse("confirm_delete_0"), Ok(Action::ConfirmDelete(0)));
        assert_eq!(parse("execute_delete_7"), Ok(Action::ExecuteDelete(7)));
        assert_eq!(parse("execute_show_key_2"), Ok(Action::ExecuteShowKey(2)));
        assert_eq!(parse("select_wallet_withdraw_1"), Ok(Action::SelectWithdrawWallet(1)));
        assert_eq!(parse("select_trade_wallet_5"), Ok(Action::SelectTradeWallet(5)));
        assert_eq!(parse("set_slippage_0.5"), Ok(Action::SlippagePreset(0.5)));
        assert_eq!(parse("set_gas_1500"), Ok(Action::GasPreset(1500)));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(matches!(
            parse("confirm_delete_x"),
            Err(ActionParseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse("execute_delete_-1"),
            Err(ActionParseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse("set_slippage_NaN"),
            Err(ActionParseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse("confirm_cancel_"),
            Err(ActionParseError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(
            parse("launch_rocket"),
            Err(ActionParseError::Unknown("launch_rocket".to_string()))
        );
    }

    #[test]
    fn test_display_parses_back() {
        let actions = vec![
            Action::Wallets,
            Action::ConfirmShowKey(3),
            Action::OrdersPage {
                list: OrderList::History,
                page: 4,
            },
            Action::ConfirmCancelOrder("0xdeadbeef".to_string()),
            Action::SlippagePreset(1.0),
            Action::GasPreset(750),
            Action::Explorer,
        ];
        for action in actions {
            assert_eq!(parse(&action.to_string()), Ok(action));
        }
    }

    #[test]
    fn test_back_navigation() {
        assert!(Action::Wallets.resets_dialogue());
        assert!(!Action::Withdraw.resets_dialogue());
        assert!(!Action::WithdrawNative.resets_dialogue());
        assert_eq!(Action::ExecuteDelete(1).owning_menu(), Action::Wallets);
        assert_eq!(Action::WithdrawToken.owning_menu(), Action::Withdraw);
        assert_eq!(Action::CancelOrder(0).owning_menu(), Action::CancelOrders);
    }
}
