//! Monad Sniper - Telegram custody bot library
//!
//! Wallet custody, ephemeral key disclosure, withdrawal dialogues and order
//! browsing for a Telegram bot on Monad.
//!
//! # Modules
//!
//! - `domain`: Core types and pure logic (Wallet, Session, dialogue, Action, pager)
//! - `ports`: Trait abstractions (ChatTransport, ChainPort, MarketDataPort, UserStorage)
//! - `adapters`: External implementations (Telegram, EVM RPC, Kuru, JSON store, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Custody store, sessions and the bot service

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
