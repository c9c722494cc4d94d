//! CLI Command Definitions
//!
//! Argument parsing for the Monad Sniper bot binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Monad Sniper - Telegram custody bot for Monad
#[derive(Parser, Debug)]
#[command(
    name = "monad-sniper",
    version = env!("CARGO_PKG_VERSION"),
    about = "Telegram custody bot for Monad wallets, withdrawals and orders",
    long_about = "Monad Sniper serves a Telegram bot that creates and imports Monad wallets, \
                  discloses private keys ephemerally, collects withdrawals and pages orders."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start polling Telegram and serving users
    Run(RunCmd),

    /// Summarize the wallet store
    Status(StatusCmd),

    /// Print a fresh hex master key for WALLET_MASTER_KEY
    GenMasterKey,
}

/// Start the bot
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/bot.toml")]
    pub config: PathBuf,

    /// Override RPC URL
    #[arg(long, value_name = "URL")]
    pub rpc_url: Option<String>,
}

/// Store summary
#[derive(Parser, Debug)]
pub struct StatusCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/bot.toml")]
    pub config: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, value_name = "FORMAT", default_value = "text")]
    pub format: String,
}
