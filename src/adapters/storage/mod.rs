//! Storage Adapter
//!
//! - `json_store`: whole-map JSON persistence with atomic replace
//! - `vault`: AES-256-GCM sealing of private keys at rest

mod json_store;
mod vault;

pub use json_store::{JsonFileStore, DEFAULT_USERS_FILE};
pub use vault::{KeyVault, VaultError, MASTER_KEY_ENV};
