//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/bot.toml.
//! Secrets (bot token, master key) come from the environment.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::domain::user::{DEFAULT_SLIPPAGE, MAX_SLIPPAGE, MIN_SLIPPAGE};
use crate::domain::GasTier;

/// Main configuration structure matching config/bot.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramSection,
    pub chain: ChainSection,
    #[serde(default)]
    pub market: MarketSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub security: SecuritySection,
    #[serde(default)]
    pub trading: TradingSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Telegram Bot API section
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSection {
    /// Bot API base URL
    #[serde(default = "default_telegram_api")]
    pub api_url: String,
    /// Bot token; prefer TELEGRAM_BOT_TOKEN
    #[serde(default)]
    pub bot_token: Option<String>,
    /// getUpdates long-poll timeout in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            api_url: default_telegram_api(),
            bot_token: None,
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

impl TelegramSection {
    /// Get bot token with environment variable override
    /// Checks TELEGRAM_BOT_TOKEN env var first, falls back to config value
    pub fn get_bot_token(&self) -> Option<String> {
        std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.bot_token.clone().filter(|t| !t.is_empty()))
    }
}

/// Chain section
#[derive(Debug, Clone, Deserialize)]
pub struct ChainSection {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Block explorer base URL
    pub explorer_url: String,
    pub chain_id: u64,
    /// Native currency symbol shown to users
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    #[serde(default = "default_network_name")]
    pub network_name: String,
}

impl ChainSection {
    /// Get RPC URL with environment variable override
    /// Checks MONAD_RPC_URL env var first, falls back to config value
    pub fn get_rpc_url(&self) -> String {
        std::env::var("MONAD_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }
}

/// Market data section
#[derive(Debug, Clone, Deserialize)]
pub struct MarketSection {
    #[serde(default = "default_market_api")]
    pub api_url: String,
    #[serde(default = "default_market_timeout")]
    pub timeout_secs: u64,
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            api_url: default_market_api(),
            timeout_secs: default_market_timeout(),
        }
    }
}

/// Storage section
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    /// User store path (~ is expanded)
    #[serde(default = "default_users_file")]
    pub users_file: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            users_file: default_users_file(),
        }
    }
}

impl StorageSection {
    pub fn users_path(&self) -> String {
        shellexpand::tilde(&self.users_file).to_string()
    }
}

/// Custody limits section
#[derive(Debug, Clone, Deserialize)]
pub struct SecuritySection {
    #[serde(default = "default_wallet_limit")]
    pub max_wallets_per_user: usize,
    /// Upper bound for "create N wallets"
    #[serde(default = "default_wallet_limit")]
    pub max_batch_wallets: usize,
    /// Seconds before a disclosed key message is deleted
    #[serde(default = "default_secret_ttl")]
    pub secret_ttl_secs: u64,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            max_wallets_per_user: default_wallet_limit(),
            max_batch_wallets: default_wallet_limit(),
            secret_ttl_secs: default_secret_ttl(),
        }
    }
}

/// Trading defaults section
#[derive(Debug, Clone, Deserialize)]
pub struct TradingSection {
    #[serde(default = "default_slippage")]
    pub default_slippage: f64,
    #[serde(default = "min_slippage")]
    pub min_slippage: f64,
    #[serde(default = "max_slippage")]
    pub max_slippage: f64,
    /// One of the gas tier prices (750, 1000, 1500)
    #[serde(default = "default_gas_price")]
    pub default_gas_price: u64,
}

impl Default for TradingSection {
    fn default() -> Self {
        Self {
            default_slippage: default_slippage(),
            min_slippage: min_slippage(),
            max_slippage: max_slippage(),
            default_gas_price: default_gas_price(),
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}
fn default_poll_timeout() -> u64 {
    30
}
fn default_native_symbol() -> String {
    "MON".to_string()
}
fn default_network_name() -> String {
    "Monad Testnet".to_string()
}
fn default_market_api() -> String {
    "https://api.kuru.io".to_string()
}
fn default_market_timeout() -> u64 {
    10
}
fn default_users_file() -> String {
    "data/users.json".to_string()
}
fn default_wallet_limit() -> usize {
    10
}
fn default_secret_ttl() -> u64 {
    60
}
fn default_slippage() -> f64 {
    DEFAULT_SLIPPAGE
}
fn min_slippage() -> f64 {
    MIN_SLIPPAGE
}
fn max_slippage() -> f64 {
    MAX_SLIPPAGE
}
fn default_gas_price() -> u64 {
    GasTier::Standard.gas_price()
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_empty = [
            ("telegram.api_url", &self.telegram.api_url),
            ("chain.rpc_url", &self.chain.rpc_url),
            ("chain.explorer_url", &self.chain.explorer_url),
            ("market.api_url", &self.market.api_url),
            ("storage.users_file", &self.storage.users_file),
        ];
        for (name, value) in non_empty {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} cannot be empty",
                    name
                )));
            }
        }

        if self.security.secret_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "secret_ttl_secs must be > 0".to_string(),
            ));
        }

        if self.security.max_batch_wallets == 0 {
            return Err(ConfigError::ValidationError(
                "max_batch_wallets must be > 0".to_string(),
            ));
        }

        if self.security.max_wallets_per_user == 0 {
            return Err(ConfigError::ValidationError(
                "max_wallets_per_user must be > 0".to_string(),
            ));
        }

        let trading = &self.trading;
        if trading.min_slippage <= 0.0 || trading.min_slippage > trading.max_slippage {
            return Err(ConfigError::ValidationError(format!(
                "slippage bounds must satisfy 0 < min <= max, got [{}, {}]",
                trading.min_slippage, trading.max_slippage
            )));
        }

        if trading.default_slippage < trading.min_slippage
            || trading.default_slippage > trading.max_slippage
        {
            return Err(ConfigError::ValidationError(format!(
                "default_slippage must be within [{}, {}], got {}",
                trading.min_slippage, trading.max_slippage, trading.default_slippage
            )));
        }

        if GasTier::from_gas_price(trading.default_gas_price).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "default_gas_price must be one of 750, 1000, 1500, got {}",
                trading.default_gas_price
            )));
        }

        if self.telegram.poll_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll_timeout_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[telegram]
api_url = "https://api.telegram.org"
poll_timeout_secs = 30

[chain]
rpc_url = "https://testnet-rpc.monad.xyz"
explorer_url = "https://testnet.monadexplorer.com"
chain_id = 10143
native_symbol = "MON"
network_name = "Monad Testnet"

[market]
api_url = "https://api.kuru.io"
timeout_secs = 10

[storage]
users_file = "data/users.json"

[security]
max_wallets_per_user = 10
max_batch_wallets = 10
secret_ttl_secs = 60

[trading]
default_slippage = 1.0
min_slippage = 0.1
max_slippage = 50.0
default_gas_price = 750

[logging]
level = "info"
"#
        .to_string()
    }

    fn load_str(content: &str) -> Result<Config, ConfigError> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        load_config(file.path())
    }

    #[test]
    fn test_load_valid_config() {
        let config = load_str(&create_valid_config()).unwrap();

        assert_eq!(config.chain.chain_id, 10143);
        assert_eq!(config.chain.native_symbol, "MON");
        assert_eq!(config.security.secret_ttl_secs, 60);
        assert_eq!(config.trading.default_gas_price, 750);
        assert_eq!(config.storage.users_file, "data/users.json");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/bot.toml");
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load_str(
            r#"
[chain]
rpc_url = "https://testnet-rpc.monad.xyz"
explorer_url = "https://testnet.monadexplorer.com"
chain_id = 10143
"#,
        )
        .unwrap();

        assert_eq!(config.telegram.poll_timeout_secs, 30);
        assert_eq!(config.security.max_wallets_per_user, 10);
        assert_eq!(config.security.max_batch_wallets, 10);
        assert_eq!(config.trading.default_slippage, 1.0);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.market.api_url, "https://api.kuru.io");
    }

    #[test]
    fn test_missing_chain_section_is_parse_error() {
        let result = load_str("[logging]\nlevel = \"debug\"\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let content = create_valid_config().replace("secret_ttl_secs = 60", "secret_ttl_secs = 0");
        let result = load_str(&content);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_zero_batch_limit_rejected() {
        let content =
            create_valid_config().replace("max_batch_wallets = 10", "max_batch_wallets = 0");
        assert!(load_str(&content).is_err());
    }

    #[test]
    fn test_inverted_slippage_bounds_rejected() {
        let content = create_valid_config()
            .replace("min_slippage = 0.1", "min_slippage = 60.0");
        let err = load_str(&content).unwrap_err();
        assert!(err.to_string().contains("slippage bounds"));
    }

    #[test]
    fn test_default_slippage_outside_bounds_rejected() {
        let content =
            create_valid_config().replace("default_slippage = 1.0", "default_slippage = 75.0");
        let err = load_str(&content).unwrap_err();
        assert!(err.to_string().contains("default_slippage"));
    }

    #[test]
    fn test_empty_rpc_url_rejected() {
        let content = create_valid_config().replace(
            "rpc_url = \"https://testnet-rpc.monad.xyz\"",
            "rpc_url = \"\"",
        );
        let err = load_str(&content).unwrap_err();
        assert!(err.to_string().contains("chain.rpc_url"));
    }

    #[test]
    fn test_unknown_gas_price_rejected() {
        let content =
            create_valid_config().replace("default_gas_price = 750", "default_gas_price = 800");
        assert!(load_str(&content).is_err());
    }

    #[test]
    fn test_users_path_expands_tilde() {
        let section = StorageSection {
            users_file: "~/monad/users.json".to_string(),
        };
        let expanded = section.users_path();
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("monad/users.json"));
    }
}
