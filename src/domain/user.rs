//! User Records
//!
//! A custodial account: display name, ordered wallet list and trading
//! settings. Wallets are addressed by position and the list is kept dense.

use serde::{Deserialize, Serialize};

use super::wallet::Wallet;

pub const DEFAULT_SLIPPAGE: f64 = 1.0;
pub const MIN_SLIPPAGE: f64 = 0.1;
pub const MAX_SLIPPAGE: f64 = 50.0;

/// Gas price tiers offered by the trading screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasTier {
    #[default]
    Standard,
    Fast,
    Rapid,
}

impl GasTier {
    pub const ALL: [GasTier; 3] = [GasTier::Standard, GasTier::Fast, GasTier::Rapid];

    /// Map a preset gas price back to its tier
    pub fn from_gas_price(price: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.gas_price() == price)
    }

    pub fn gas_price(&self) -> u64 {
        match self {
            GasTier::Standard => 750,
            GasTier::Fast => 1000,
            GasTier::Rapid => 1500,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GasTier::Standard => "standard",
            GasTier::Fast => "fast",
            GasTier::Rapid => "rapid",
        }
    }
}

/// Per-user trading preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub slippage: f64,
    pub auto_slippage: bool,
    #[serde(rename = "gas_settings")]
    pub gas_tier: GasTier,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            slippage: DEFAULT_SLIPPAGE,
            auto_slippage: false,
            gas_tier: GasTier::Standard,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub username: Option<String>,
    wallets: Vec<Wallet>,
    pub settings: Settings,
}

impl User {
    pub fn new(username: Option<String>) -> Self {
        Self {
            username,
            wallets: Vec::new(),
            settings: Settings::default(),
        }
    }

    pub fn with_wallets(username: Option<String>, wallets: Vec<Wallet>, settings: Settings) -> Self {
        Self {
            username,
            wallets,
            settings,
        }
    }

    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("Anonymous")
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn wallet(&self, index: usize) -> Option<&Wallet> {
        self.wallets.get(index)
    }

    pub fn wallet_count(&self) -> usize {
        self.wallets.len()
    }

    pub fn push_wallet(&mut self, wallet: Wallet) -> usize {
        self.wallets.push(wallet);
        self.wallets.len() - 1
    }

    /// Remove and compact. `None` when the index is out of range.
    pub fn remove_wallet(&mut self, index: usize) -> Option<Wallet> {
        if index >= self.wallets.len() {
            return None;
        }
        Some(self.wallets.remove(index))
    }
}
