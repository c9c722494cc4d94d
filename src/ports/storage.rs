use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::User;

/// All user records keyed by transport identity
pub type UserMap = BTreeMap<String, User>;

/// Durable storage error type
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupted record for user {user}: {reason}")]
    Corrupted { user: String, reason: String },

    #[error("Key vault error: {0}")]
    Vault(String),
}

/// Whole-store persistence: the full mapping is rewritten on every save
#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn load(&self) -> Result<UserMap, StorageError>;

    async fn save(&self, users: &UserMap) -> Result<(), StorageError>;
}
