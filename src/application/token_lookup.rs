//! Token Lookup
//!
//! Aggregates contract metadata, market data and bytecode checks into a
//! [`TokenReport`]. Only the metadata read is fatal: market data already
//! degrades to defaults and capability scanning is best effort.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::short_address;
use crate::ports::{
    ChainError, ChainPort, Clock, ContractCapabilities, ContractMetadata, MarketDataPort,
    PairLpInfo, SocialLinks, TokenMarketInfo,
};

const WEI_PER_UNIT: f64 = 1e18;

/// Everything shown on the token screen
#[derive(Debug, Clone, PartialEq)]
pub struct TokenReport {
    pub address: String,
    pub metadata: ContractMetadata,
    pub market: TokenMarketInfo,
    pub lp: PairLpInfo,
    /// `None` when the social provider was unreachable
    pub socials: Option<SocialLinks>,
    /// `None` when the bytecode could not be read
    pub capabilities: Option<ContractCapabilities>,
    pub checked_at: DateTime<Utc>,
}

impl TokenReport {
    /// `price * totalSupply / 10^decimals`
    pub fn market_cap(&self) -> f64 {
        let supply = self.metadata.total_supply as f64 / 10f64.powi(self.metadata.decimals as i32);
        self.market.price * supply
    }

    pub fn lp_burned_pct(&self) -> f64 {
        if self.lp.total_supply > 0.0 {
            self.lp.burned_amount * 100.0 / self.lp.total_supply
        } else {
            0.0
        }
    }

    /// "D days, H hours" since pair creation
    pub fn pair_age(&self) -> Option<String> {
        let created = self.market.pair_created_at?;
        let age = (self.checked_at.timestamp() - created).max(0);
        let days = age / 86_400;
        let hours = (age % 86_400) / 3_600;
        Some(format!("{} days, {} hours", days, hours))
    }

    /// Reserves in whole units: (native, token)
    pub fn reserves(&self) -> Option<(f64, f64)> {
        let r0 = self.lp.reserve0?;
        let r1 = self.lp.reserve1?;
        Some((r0 as f64 / WEI_PER_UNIT, r1 as f64 / WEI_PER_UNIT))
    }
}

pub struct TokenLookup {
    chain: Arc<dyn ChainPort>,
    market: Arc<dyn MarketDataPort>,
    clock: Arc<dyn Clock>,
}

impl TokenLookup {
    pub fn new(
        chain: Arc<dyn ChainPort>,
        market: Arc<dyn MarketDataPort>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chain,
            market,
            clock,
        }
    }

    pub async fn lookup(&self, address: &str) -> Result<TokenReport, ChainError> {
        let metadata = self.chain.get_contract_metadata(address).await?;

        let (market, lp, socials, capabilities) = tokio::join!(
            self.market.get_token_market_info(address),
            self.market.get_pair_lp_info(address),
            self.market.get_social_links(address),
            self.chain.get_contract_capabilities(address),
        );

        let capabilities = match capabilities {
            Ok(capabilities) => Some(capabilities),
            Err(e) => {
                tracing::warn!(
                    "Capability scan failed for {}: {}",
                    short_address(address),
                    e
                );
                None
            }
        };

        tracing::debug!(
            "Token lookup {} -> {} ({}) price {}",
            short_address(address),
            metadata.name,
            metadata.symbol,
            market.price
        );

        Ok(TokenReport {
            address: address.to_string(),
            metadata,
            market,
            lp,
            socials,
            capabilities,
            checked_at: self.clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::{FixedClock, MockChain, MockMarketData};

    const TOKEN: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

    fn metadata() -> ContractMetadata {
        ContractMetadata {
            name: "Seed".to_string(),
            symbol: "SEED".to_string(),
            decimals: 18,
            total_supply: 1_000_000 * 10u128.pow(18),
        }
    }

    fn lookup_with(chain: MockChain, market: MockMarketData) -> TokenLookup {
        TokenLookup::new(
            Arc::new(chain),
            Arc::new(market),
            Arc::new(FixedClock::default()),
        )
    }

    #[tokio::test]
    async fn test_lookup_aggregates_sources() {
        let clock = FixedClock::default();
        let chain = MockChain::new().with_contract(
            TOKEN,
            metadata(),
            ContractCapabilities {
                mintable: true,
                ..Default::default()
            },
        );
        let market = MockMarketData::new()
            .with_market(TokenMarketInfo {
                price: 0.002,
                liquidity: "1.98K".to_string(),
                pair_created_at: Some(clock.now().timestamp() - (3 * 86_400 + 5 * 3_600 + 59)),
            })
            .with_lp(PairLpInfo {
                total_supply: 200.0,
                burned_amount: 50.0,
                reserve0: Some(12 * 10u128.pow(18)),
                reserve1: Some(5 * 10u128.pow(17)),
            });

        let report = lookup_with(chain, market).lookup(TOKEN).await.unwrap();

        assert_eq!(report.metadata.symbol, "SEED");
        assert!((report.market_cap() - 2000.0).abs() < 1e-6);
        assert!((report.lp_burned_pct() - 25.0).abs() < 1e-9);
        assert_eq!(report.pair_age().as_deref(), Some("3 days, 5 hours"));
        assert_eq!(report.reserves(), Some((12.0, 0.5)));
        assert_eq!(report.capabilities.map(|c| c.mintable), Some(true));
        assert!(report.socials.is_none());
    }

    #[tokio::test]
    async fn test_unknown_contract_is_an_error() {
        let market = MockMarketData::new();
        let result = lookup_with(MockChain::new(), market).lookup(TOKEN).await;
        assert!(matches!(result, Err(ChainError::ContractUnavailable(_))));
    }

    #[test]
    fn test_missing_market_fields() {
        let report = TokenReport {
            address: TOKEN.to_string(),
            metadata: metadata(),
            market: TokenMarketInfo::default(),
            lp: PairLpInfo::default(),
            socials: None,
            capabilities: None,
            checked_at: FixedClock::default().now(),
        };
        assert_eq!(report.market_cap(), 0.0);
        assert_eq!(report.lp_burned_pct(), 0.0);
        assert_eq!(report.pair_age(), None);
        assert_eq!(report.reserves(), None);
    }
}
