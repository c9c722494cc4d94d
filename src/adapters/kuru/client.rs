//! Kuru DEX API Client
//!
//! Token price, pair LP data and social links. Every lookup degrades to
//! defaults on non-200 responses or transport errors; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use super::types::{parse_pair_info, parse_socials, parse_token_info};
use crate::ports::{MarketDataPort, PairLpInfo, SocialLinks, TokenMarketInfo};

#[derive(Debug, Error)]
pub enum KuruError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Configuration for the KuruClient
#[derive(Debug, Clone)]
pub struct KuruConfig {
    /// API base URL
    pub api_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for KuruConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.kuru.io".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the Kuru market data API
#[derive(Debug, Clone)]
pub struct KuruClient {
    config: KuruConfig,
    http: Client,
}

impl KuruClient {
    pub fn with_config(config: KuruConfig) -> Result<Self, KuruError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// GET a JSON document; `None` on any failure
    async fn get_json(&self, path: &str) -> Option<Value> {
        let url = self.url(path);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Kuru request {} failed: {}", path, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Kuru request {} returned {}", path, status);
            return None;
        }

        match response.json::<Value>().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!("Kuru response for {} was not JSON: {}", path, e);
                None
            }
        }
    }
}

#[async_trait]
impl MarketDataPort for KuruClient {
    async fn get_token_market_info(&self, address: &str) -> TokenMarketInfo {
        self.get_json(&format!("/v1/tokens/{}", address))
            .await
            .map(|body| parse_token_info(&body))
            .unwrap_or_default()
    }

    async fn get_pair_lp_info(&self, address: &str) -> PairLpInfo {
        self.get_json(&format!("/v1/pairs/{}", address))
            .await
            .map(|body| parse_pair_info(&body))
            .unwrap_or_default()
    }

    async fn get_social_links(&self, address: &str) -> Option<SocialLinks> {
        self.get_json(&format!("/v1/tokens/{}/social", address))
            .await
            .map(|body| parse_socials(&body))
    }
}
