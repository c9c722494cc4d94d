//! Orders as seen by the bot
//!
//! Orders are owned by an external order service; the bot only reads and
//! cancels them.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "Buy"),
            OrderSide::Sell => write!(f, "Sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl OrderStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::PartiallyFilled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Open => "Open",
            OrderStatus::PartiallyFilled => "Partially filled",
            OrderStatus::Filled => "Filled",
            OrderStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub side: OrderSide,
    pub token_symbol: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub status: OrderStatus,
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// First 8 characters of the id
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }

    /// One-line label used on list buttons
    pub fn label(&self) -> String {
        format!(
            "{} {} {} (#{})",
            self.side,
            self.amount,
            self.token_symbol,
            self.short_id()
        )
    }
}
