//! CLI Adapter
//!
//! Command-line interface for the Monad Sniper bot.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, RunCmd, StatusCmd};
