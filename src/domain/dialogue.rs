//! Dialogue State Machine
//!
//! Pure transitions for free-text input. The caller owns I/O: this module
//! only inspects the session, validates the text and says what to do next.
//!
//! ```text
//! Idle
//!  -> WalletCount
//!  -> ImportedKey
//!  -> WithdrawAmount -> WithdrawAddress -> Idle (native withdrawal)
//!  -> TokenAddress -> TokenAmount -> TokenDestination -> Idle (token withdrawal)
//! ```
//!
//! Text that looks like a contract address is routed to token lookup before
//! the session is consulted, even in the middle of an address step.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use super::address::looks_like_contract_address;
use super::session::{Session, WaitingFor};
use super::wallet::Wallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueRules {
    /// Upper bound for "create N wallets"
    pub max_batch_wallets: usize,
}

impl Default for DialogueRules {
    fn default() -> Self {
        Self {
            max_batch_wallets: 10,
        }
    }
}

/// Input rejected in place; the marker stays set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a valid number between 1 and {max}.")]
    NotANumber { max: usize },
    #[error("Please enter a number between 1 and {max}.")]
    CountOutOfRange { max: usize },
    #[error("❌ Invalid private key. Please try again or go back.")]
    InvalidKeyFormat,
    #[error("❌ Invalid amount. Please enter a valid positive number.")]
    InvalidAmount,
    #[error("❌ Invalid address. Please enter a valid address.")]
    InvalidAddress,
    #[error("❌ Invalid token address. Please enter a valid contract address.")]
    InvalidTokenAddress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawAsset {
    Native,
    Token(String),
}

/// A completed withdrawal flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalIntent {
    pub wallet_index: usize,
    pub asset: WithdrawAsset,
    pub amount: Decimal,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextOutcome {
    /// Contract-address heuristic matched
    TokenLookup(String),
    /// No flow active
    Ignored,
    Reprompt { state: WaitingFor, error: InputError },
    CreateWallets(usize),
    ImportKey(Wallet),
    AskWithdrawAddress { amount: Decimal },
    AskTokenAmount { token: String },
    AskTokenDestination { amount: Decimal },
    Withdraw(WithdrawalIntent),
    /// The flow referenced a wallet that no longer exists; the flow was dropped
    StaleWallet,
}

/// Apply one free-text message to the session.
///
/// `wallet_count` is the user's current wallet count, used to detect a
/// selected wallet that disappeared mid-flow.
pub fn on_text(
    session: &mut Session,
    text: &str,
    wallet_count: usize,
    rules: &DialogueRules,
    is_valid_address: impl Fn(&str) -> bool,
) -> TextOutcome {
    let text = text.trim();

    if looks_like_contract_address(text) {
        return TextOutcome::TokenLookup(text.to_string());
    }

    let Some(state) = session.waiting_for() else {
        return TextOutcome::Ignored;
    };

    let reprompt = |error| TextOutcome::Reprompt { state, error };

    match state {
        WaitingFor::WalletCount => {
            let max = rules.max_batch_wallets;
            match text.parse::<usize>() {
                Ok(n) if (1..=max).contains(&n) => {
                    session.finish();
                    TextOutcome::CreateWallets(n)
                }
                Ok(_) => reprompt(InputError::CountOutOfRange { max }),
                Err(_) => reprompt(InputError::NotANumber { max }),
            }
        }

        WaitingFor::ImportedKey => match Wallet::import(text) {
            Ok(wallet) => {
                session.finish();
                TextOutcome::ImportKey(wallet)
            }
            Err(_) => reprompt(InputError::InvalidKeyFormat),
        },

        WaitingFor::WithdrawAmount => match parse_amount(text) {
            Some(amount) => {
                session.input_mut().withdraw_amount = Some(amount);
                session.advance(WaitingFor::WithdrawAddress);
                TextOutcome::AskWithdrawAddress { amount }
            }
            None => reprompt(InputError::InvalidAmount),
        },

        WaitingFor::WithdrawAddress => {
            if !is_valid_address(text) {
                return reprompt(InputError::InvalidAddress);
            }
            let input = session.input().clone();
            match (input.selected_wallet, input.withdraw_amount) {
                (Some(wallet_index), Some(amount)) if wallet_index < wallet_count => {
                    session.finish();
                    TextOutcome::Withdraw(WithdrawalIntent {
                        wallet_index,
                        asset: WithdrawAsset::Native,
                        amount,
                        destination: text.to_string(),
                    })
                }
                _ => {
                    session.reset();
                    TextOutcome::StaleWallet
                }
            }
        }

        WaitingFor::TokenAddress => {
            if !is_valid_address(text) {
                return reprompt(InputError::InvalidTokenAddress);
            }
            session.input_mut().token_address = Some(text.to_string());
            session.advance(WaitingFor::TokenAmount);
            TextOutcome::AskTokenAmount {
                token: text.to_string(),
            }
        }

        WaitingFor::TokenAmount => match parse_amount(text) {
            Some(amount) => {
                session.input_mut().token_amount = Some(amount);
                session.advance(WaitingFor::TokenDestination);
                TextOutcome::AskTokenDestination { amount }
            }
            None => reprompt(InputError::InvalidAmount),
        },

        WaitingFor::TokenDestination => {
            if !is_valid_address(text) {
                return reprompt(InputError::InvalidAddress);
            }
            let input = session.input().clone();
            match (input.selected_wallet, input.token_address, input.token_amount) {
                (Some(wallet_index), Some(token), Some(amount)) if wallet_index < wallet_count => {
                    session.finish();
                    TextOutcome::Withdraw(WithdrawalIntent {
                        wallet_index,
                        asset: WithdrawAsset::Token(token),
                        amount,
                        destination: text.to_string(),
                    })
                }
                _ => {
                    session.reset();
                    TextOutcome::StaleWallet
                }
            }
        }
    }
}

/// Strictly positive decimal; plain or scientific notation
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let amount = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()?;
    if amount > Decimal::ZERO {
        Some(amount.normalize())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::is_valid_address;
    use rust_decimal_macros::dec;

    const DEST: &str = "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
    const TOKEN: &str = "fb6916095ca1df60bb79ce92ce3ea74c37c5d359";
    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    fn feed(session: &mut Session, text: &str, wallets: usize) -> TextOutcome {
        on_text(session, text, wallets, &DialogueRules::default(), is_valid_address)
    }

    #[test]
    fn test_idle_text_is_ignored() {
        let mut session = Session::default();
        assert_eq!(feed(&mut session, "hello", 1), TextOutcome::Ignored);
    }

    #[test]
    fn test_wallet_count_bounds() {
        let mut session = Session::default();
        session.begin(WaitingFor::WalletCount);

        assert_eq!(
            feed(&mut session, "11", 1),
            TextOutcome::Reprompt {
                state: WaitingFor::WalletCount,
                error: InputError::CountOutOfRange { max: 10 }
            }
        );
        assert_eq!(
            feed(&mut session, "0", 1),
            TextOutcome::Reprompt {
                state: WaitingFor::WalletCount,
                error: InputError::CountOutOfRange { max: 10 }
            }
        );
        assert!(matches!(
            feed(&mut session, "three", 1),
            TextOutcome::Reprompt { error: InputError::NotANumber { .. }, .. }
        ));
        assert_eq!(session.waiting_for(), Some(WaitingFor::WalletCount));

        assert_eq!(feed(&mut session, " 3 ", 1), TextOutcome::CreateWallets(3));
        assert!(session.is_idle());
    }

    #[test]
    fn test_import_bad_key_reprompts() {
        let mut session = Session::default();
        session.begin(WaitingFor::ImportedKey);

        assert_eq!(
            feed(&mut session, "0x01", 0),
            TextOutcome::Reprompt {
                state: WaitingFor::ImportedKey,
                error: InputError::InvalidKeyFormat
            }
        );
        assert_eq!(session.waiting_for(), Some(WaitingFor::ImportedKey));
    }

    #[test]
    fn test_import_good_key() {
        let mut session = Session::default();
        session.begin(WaitingFor::ImportedKey);

        match feed(&mut session, KEY_ONE, 0) {
            TextOutcome::ImportKey(wallet) => {
                assert_eq!(wallet.address(), "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf")
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(session.is_idle());
    }

    #[test]
    fn test_native_withdrawal_flow_leaves_no_residue() {
        let mut session = Session::default();
        session.select_wallet(0);
        session.begin(WaitingFor::WithdrawAmount);

        assert_eq!(
            feed(&mut session, "-1", 1),
            TextOutcome::Reprompt {
                state: WaitingFor::WithdrawAmount,
                error: InputError::InvalidAmount
            }
        );
        assert_eq!(
            feed(&mut session, "1.5", 1),
            TextOutcome::AskWithdrawAddress { amount: dec!(1.5) }
        );
        assert_eq!(
            feed(&mut session, "not an address", 1),
            TextOutcome::Reprompt {
                state: WaitingFor::WithdrawAddress,
                error: InputError::InvalidAddress
            }
        );

        let outcome = feed(&mut session, DEST, 1);
        assert_eq!(
            outcome,
            TextOutcome::Withdraw(WithdrawalIntent {
                wallet_index: 0,
                asset: WithdrawAsset::Native,
                amount: dec!(1.5),
                destination: DEST.to_string(),
            })
        );
        assert!(session.is_idle());
        assert!(session.input().is_empty());
    }

    #[test]
    fn test_token_withdrawal_flow() {
        let mut session = Session::default();
        session.select_wallet(1);
        session.begin(WaitingFor::TokenAddress);

        assert!(matches!(
            feed(&mut session, "nope", 2),
            TextOutcome::Reprompt { error: InputError::InvalidTokenAddress, .. }
        ));
        assert_eq!(
            feed(&mut session, TOKEN, 2),
            TextOutcome::AskTokenAmount { token: TOKEN.to_string() }
        );
        assert_eq!(
            feed(&mut session, "0", 2),
            TextOutcome::Reprompt {
                state: WaitingFor::TokenAmount,
                error: InputError::InvalidAmount
            }
        );
        assert_eq!(
            feed(&mut session, "250", 2),
            TextOutcome::AskTokenDestination { amount: dec!(250) }
        );

        match feed(&mut session, DEST, 2) {
            TextOutcome::Withdraw(intent) => {
                assert_eq!(intent.wallet_index, 1);
                assert_eq!(intent.asset, WithdrawAsset::Token(TOKEN.to_string()));
                assert_eq!(intent.amount, dec!(250));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(session.is_idle());
        assert!(session.input().is_empty());
    }

    #[test]
    fn test_heuristic_overrides_address_step() {
        let mut session = Session::default();
        session.select_wallet(0);
        session.begin(WaitingFor::WithdrawAmount);
        feed(&mut session, "2", 1);

        let prefixed = format!("0x{}", DEST);
        assert_eq!(feed(&mut session, &prefixed, 1), TextOutcome::TokenLookup(prefixed.clone()));
        // the flow is untouched
        assert_eq!(session.waiting_for(), Some(WaitingFor::WithdrawAddress));
        assert_eq!(session.input().withdraw_amount, Some(dec!(2)));
    }

    #[test]
    fn test_stale_wallet_drops_flow() {
        let mut session = Session::default();
        session.select_wallet(3);
        session.begin(WaitingFor::WithdrawAmount);
        feed(&mut session, "1", 4);

        // wallet 3 was deleted elsewhere; only 2 wallets remain
        assert_eq!(feed(&mut session, DEST, 2), TextOutcome::StaleWallet);
        assert!(session.is_idle());
        assert!(session.input().is_empty());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0.10"), Some(dec!(0.1)));
        assert_eq!(parse_amount("1e-3"), Some(dec!(0.001)));
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }
}
