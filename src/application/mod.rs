//! Application Layer
//!
//! Use cases wired from the domain and the ports: the custody store, the
//! per-user sessions, secret disclosure, and the bot service that answers
//! commands, free text and button presses.

pub mod bot;
pub mod disclosure;
pub mod errors;
pub mod router;
pub mod sessions;
pub mod text_input;
pub mod token_lookup;
pub mod views;
pub mod wallet_store;

pub use bot::{BotPorts, BotService, BotSettings, Dispatcher};
pub use disclosure::{DisclosureHandle, SecretDisclosure};
pub use errors::BotError;
pub use sessions::SessionRegistry;
pub use token_lookup::{TokenLookup, TokenReport};
pub use views::Views;
pub use wallet_store::{StoreError, WalletCustodyStore};
