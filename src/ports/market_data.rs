use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Price and pair data for a token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMarketInfo {
    pub price: f64,
    /// Liquidity as reported by the provider (free-form)
    pub liquidity: String,
    /// Pair creation time, unix seconds
    pub pair_created_at: Option<i64>,
}

/// LP token data for a pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairLpInfo {
    pub total_supply: f64,
    pub burned_amount: f64,
    /// Raw reserves in base units; `None` when the provider sent garbage
    pub reserve0: Option<u128>,
    pub reserve1: Option<u128>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub website: Option<String>,
    pub telegram: Option<String>,
    pub twitter: Option<String>,
    pub discord: Option<String>,
}

impl SocialLinks {
    pub fn is_empty(&self) -> bool {
        self.website.is_none()
            && self.telegram.is_none()
            && self.twitter.is_none()
            && self.discord.is_none()
    }
}

/// Market data port trait
///
/// Lookups never fail: an unavailable provider yields zero/empty defaults.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    async fn get_token_market_info(&self, address: &str) -> TokenMarketInfo;

    async fn get_pair_lp_info(&self, address: &str) -> PairLpInfo;

    /// `None` when the provider could not be reached
    async fn get_social_links(&self, address: &str) -> Option<SocialLinks>;
}
