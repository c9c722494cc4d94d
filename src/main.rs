//! Monad Sniper - Telegram custody bot
//!
//! Creates and imports Monad wallets, discloses private keys ephemerally,
//! collects withdrawals and pages orders over the Telegram Bot API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use monad_sniper::adapters::cli::{CliApp, Command, RunCmd, StatusCmd};
use monad_sniper::adapters::{
    EvmRpcClient, EvmRpcConfig, InMemoryOrderBook, JsonFileStore, KeyVault, KuruClient,
    KuruConfig, QueuedWithdrawals, SystemClock, TelegramClient, TelegramConfig,
    TokioDeletionScheduler,
};
use monad_sniper::application::{BotPorts, BotService, BotSettings, Dispatcher, WalletCustodyStore};
use monad_sniper::config::{load_config, Config};
use monad_sniper::domain::{GasTier, Settings};
use monad_sniper::ports::ChatTransport;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in bot.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    match app.command {
        Command::Run(cmd) => {
            let config = load_config(&cmd.config).context("Failed to load configuration")?;
            init_logging(app.verbose, app.debug, &config.logging.level)?;
            run_command(cmd, config).await
        }
        Command::Status(cmd) => {
            let config = load_config(&cmd.config).context("Failed to load configuration")?;
            init_logging(app.verbose, app.debug, &config.logging.level)?;
            status_command(cmd, config).await
        }
        Command::GenMasterKey => {
            init_logging(app.verbose, app.debug, "warn")?;
            gen_master_key_command()
        }
    }
}

/// RUST_LOG wins, then the CLI flags, then the configured level
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if debug => EnvFilter::new("debug"),
        Err(_) if verbose => EnvFilter::new("info"),
        Err(_) => EnvFilter::try_new(configured)
            .with_context(|| format!("Invalid log level '{}'", configured))?,
    };

    fmt().with_env_filter(filter).init();
    Ok(())
}

fn default_settings(config: &Config) -> Settings {
    Settings {
        slippage: config.trading.default_slippage,
        auto_slippage: false,
        gas_tier: GasTier::from_gas_price(config.trading.default_gas_price).unwrap_or_default(),
    }
}

async fn open_store(config: &Config) -> Result<Arc<WalletCustodyStore>> {
    let vault = KeyVault::from_env().context("Failed to load wallet master key")?;
    let storage = JsonFileStore::new(config.storage.users_path(), vault);
    let store = WalletCustodyStore::open(Arc::new(storage), config.security.max_wallets_per_user)
        .await
        .context("Failed to open wallet store")?
        .with_default_settings(default_settings(config));
    Ok(Arc::new(store))
}

async fn run_command(cmd: RunCmd, config: Config) -> Result<()> {
    tracing::info!("Starting Monad Sniper bot on {}...", config.chain.network_name);

    let bot_token = config
        .telegram
        .get_bot_token()
        .context("TELEGRAM_BOT_TOKEN is not set")?;
    let telegram = TelegramClient::with_config(TelegramConfig {
        api_url: config.telegram.api_url.clone(),
        bot_token,
        poll_timeout: Duration::from_secs(config.telegram.poll_timeout_secs),
    })
    .context("Failed to create Telegram client")?;

    let rpc_url = cmd.rpc_url.unwrap_or_else(|| config.chain.get_rpc_url());
    let chain = EvmRpcClient::with_config(EvmRpcConfig::with_rpc_url(rpc_url))
        .context("Failed to create RPC client")?;
    tracing::info!("Using RPC endpoint {}", chain.rpc_url());

    let market = KuruClient::with_config(KuruConfig {
        api_url: config.market.api_url.clone(),
        timeout: Duration::from_secs(config.market.timeout_secs),
    })
    .context("Failed to create market data client")?;

    let store = open_store(&config).await?;

    let transport: Arc<dyn ChatTransport> = Arc::new(telegram.clone());
    let clock = Arc::new(SystemClock);
    let ports = BotPorts {
        transport: transport.clone(),
        chain: Arc::new(chain),
        market: Arc::new(market),
        orders: Arc::new(InMemoryOrderBook::new()),
        withdrawals: Arc::new(QueuedWithdrawals::new()),
        scheduler: Arc::new(TokioDeletionScheduler::new(transport, clock.clone())),
        clock,
    };
    let service = Arc::new(BotService::new(store, ports, BotSettings::from(&config)));

    let mut dispatcher = Dispatcher::new(service);
    let dispatched = dispatcher
        .run(telegram.poller(), async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received");
        })
        .await;

    tracing::info!("Monad Sniper stopped after {} updates", dispatched);
    Ok(())
}

async fn status_command(cmd: StatusCmd, config: Config) -> Result<()> {
    let store = open_store(&config).await?;
    let users = store.user_count().await;
    let wallets = store.total_wallets().await;
    let path = config.storage.users_path();

    match cmd.format.as_str() {
        "json" => {
            let summary = serde_json::json!({
                "users_file": path,
                "users": users,
                "wallets": wallets,
                "network": &config.chain.network_name,
                "chain_id": config.chain.chain_id,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {
            println!("Users file: {}", path);
            println!("Network:    {} (chain id {})", config.chain.network_name, config.chain.chain_id);
            println!("Users:      {}", users);
            println!("Wallets:    {}", wallets);
        }
    }

    Ok(())
}

fn gen_master_key_command() -> Result<()> {
    let key = KeyVault::generate_master_key().context("Failed to generate master key")?;
    println!("{}", key);
    eprintln!("Store this as WALLET_MASTER_KEY. Losing it makes every stored wallet unreadable.");
    Ok(())
}
