//! Telegram Adapter
//!
//! Bot API transport over `reqwest`: outbound messages with inline
//! keyboards and Markdown, message edits and deletion, callback
//! acknowledgement, and `getUpdates` long polling.

mod client;
mod types;

pub use client::{TelegramClient, TelegramConfig, TelegramPoller};
pub use types::to_event;
