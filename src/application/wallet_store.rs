//! Wallet Custody Store
//!
//! In-memory user map backed by a [`UserStorage`]. Every mutation is applied
//! to a copy of the map, flushed whole, and only then swapped in; a failed
//! flush leaves memory equal to what is on disk. Flushes are serialized
//! process-wide by `flush_lock`.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{Settings, User, Wallet, WalletError};
use crate::ports::{StorageError, UserIdentity, UserMap, UserStorage};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("wallet index {index} out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown user {0}")]
    UnknownUser(String),

    #[error("Maximum of {0} wallets allowed per user")]
    WalletLimitReached(usize),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("store flush failed: {0}")]
    Persistence(#[from] StorageError),
}

pub struct WalletCustodyStore {
    users: RwLock<UserMap>,
    storage: Arc<dyn UserStorage>,
    flush_lock: Mutex<()>,
    max_wallets_per_user: usize,
    default_settings: Settings,
}

impl WalletCustodyStore {
    /// Load every user record from storage
    pub async fn open(
        storage: Arc<dyn UserStorage>,
        max_wallets_per_user: usize,
    ) -> Result<Self, StoreError> {
        let users = storage.load().await?;
        tracing::info!(
            "Loaded {} users ({} wallets)",
            users.len(),
            users.values().map(User::wallet_count).sum::<usize>()
        );

        Ok(Self {
            users: RwLock::new(users),
            storage,
            flush_lock: Mutex::new(()),
            max_wallets_per_user,
            default_settings: Settings::default(),
        })
    }

    /// Settings given to users created from now on
    pub fn with_default_settings(mut self, settings: Settings) -> Self {
        self.default_settings = settings;
        self
    }

    pub fn max_wallets_per_user(&self) -> usize {
        self.max_wallets_per_user
    }

    /// Fresh key pair from the OS random source
    pub fn generate_wallet(&self) -> Result<Wallet, StoreError> {
        Ok(Wallet::generate()?)
    }

    /// Parse a hex private key, with or without `0x`
    pub fn import_wallet(&self, raw_key: &str) -> Result<Wallet, StoreError> {
        Ok(Wallet::import(raw_key)?)
    }

    /// Append one wallet, creating the user if absent. Returns its index.
    pub async fn add_wallet(
        &self,
        identity: &UserIdentity,
        wallet: Wallet,
    ) -> Result<usize, StoreError> {
        let first = self.add_wallets(identity, vec![wallet]).await?;
        Ok(first)
    }

    /// Append several wallets with a single flush. Returns the index of the
    /// first one. Either all are added or none.
    pub async fn add_wallets(
        &self,
        identity: &UserIdentity,
        wallets: Vec<Wallet>,
    ) -> Result<usize, StoreError> {
        let max = self.max_wallets_per_user;
        let count = wallets.len();
        let defaults = self.default_settings.clone();

        let first = self
            .mutate(|users| {
                let user = users.entry(identity.id.clone()).or_insert_with(|| {
                    let mut user = User::new(identity.username.clone());
                    user.settings = defaults;
                    user
                });
                if user.wallet_count() + count > max {
                    return Err(StoreError::WalletLimitReached(max));
                }
                let first = user.wallet_count();
                for wallet in wallets {
                    user.push_wallet(wallet);
                }
                Ok(first)
            })
            .await?;

        tracing::info!(
            "Added {} wallet(s) for user {} (indices {}..{})",
            count,
            identity.id,
            first,
            first + count
        );
        Ok(first)
    }

    /// Remove the wallet at `index`; later wallets shift down by one
    pub async fn remove_wallet(&self, user_id: &str, index: usize) -> Result<Wallet, StoreError> {
        let removed = self
            .mutate(|users| {
                let user = users
                    .get_mut(user_id)
                    .ok_or(StoreError::IndexOutOfRange { index, len: 0 })?;
                let len = user.wallet_count();
                user.remove_wallet(index)
                    .ok_or(StoreError::IndexOutOfRange { index, len })
            })
            .await?;

        tracing::info!(
            "Removed wallet {} ({}) for user {}",
            index,
            removed.short_address(),
            user_id
        );
        Ok(removed)
    }

    pub async fn update_settings(
        &self,
        user_id: &str,
        update: impl FnOnce(&mut Settings),
    ) -> Result<Settings, StoreError> {
        self.mutate(|users| {
            let user = users
                .get_mut(user_id)
                .ok_or_else(|| StoreError::UnknownUser(user_id.to_string()))?;
            update(&mut user.settings);
            Ok(user.settings.clone())
        })
        .await
    }

    /// Consistent snapshot of a user's wallets (empty for unknown users)
    pub async fn list_wallets(&self, user_id: &str) -> Vec<Wallet> {
        self.users
            .read()
            .await
            .get(user_id)
            .map(|u| u.wallets().to_vec())
            .unwrap_or_default()
    }

    pub async fn wallet(&self, user_id: &str, index: usize) -> Option<Wallet> {
        self.users
            .read()
            .await
            .get(user_id)
            .and_then(|u| u.wallet(index).cloned())
    }

    pub async fn wallet_count(&self, user_id: &str) -> usize {
        self.users
            .read()
            .await
            .get(user_id)
            .map(User::wallet_count)
            .unwrap_or(0)
    }

    pub async fn has_user(&self, user_id: &str) -> bool {
        self.users.read().await.contains_key(user_id)
    }

    /// The user's settings, or the defaults for unknown users
    pub async fn settings(&self, user_id: &str) -> Settings {
        self.users
            .read()
            .await
            .get(user_id)
            .map(|u| u.settings.clone())
            .unwrap_or_else(|| self.default_settings.clone())
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn total_wallets(&self) -> usize {
        self.users
            .read()
            .await
            .values()
            .map(User::wallet_count)
            .sum()
    }

    /// Clone, apply, flush, swap. A failed `apply` or flush changes nothing.
    async fn mutate<R>(
        &self,
        apply: impl FnOnce(&mut UserMap) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let _flush = self.flush_lock.lock().await;

        let mut next = self.users.read().await.clone();
        let result = apply(&mut next)?;

        if let Err(e) = self.storage.save(&next).await {
            tracing::error!("Store flush failed, mutation discarded: {}", e);
            return Err(e.into());
        }

        *self.users.write().await = next;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::MemoryStorage;

    const KEY_1: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const KEY_2: &str = "0000000000000000000000000000000000000000000000000000000000000002";
    const KEY_3: &str = "0000000000000000000000000000000000000000000000000000000000000003";

    fn alice() -> UserIdentity {
        UserIdentity {
            id: "42".to_string(),
            username: Some("alice".to_string()),
        }
    }

    async fn store_with(storage: Arc<MemoryStorage>) -> WalletCustodyStore {
        WalletCustodyStore::open(storage, 10).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_wallet_creates_user_with_defaults() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(storage.clone()).await;

        let wallet = store.import_wallet(KEY_1).unwrap();
        let index = store.add_wallet(&alice(), wallet.clone()).await.unwrap();

        assert_eq!(index, 0);
        assert!(store.has_user("42").await);
        assert_eq!(store.list_wallets("42").await, vec![wallet]);
        assert_eq!(store.settings("42").await, Settings::default());

        let persisted = storage.snapshot();
        assert_eq!(persisted["42"].wallet_count(), 1);
        assert_eq!(persisted["42"].display_name(), "alice");
    }

    #[tokio::test]
    async fn test_remove_wallet_compacts() {
        let store = store_with(Arc::new(MemoryStorage::new())).await;
        let wallets: Vec<Wallet> = [KEY_1, KEY_2, KEY_3]
            .iter()
            .map(|k| Wallet::import(k).unwrap())
            .collect();
        store.add_wallets(&alice(), wallets.clone()).await.unwrap();

        let removed = store.remove_wallet("42", 1).await.unwrap();
        assert_eq!(removed, wallets[1]);

        let remaining = store.list_wallets("42").await;
        assert_eq!(remaining, vec![wallets[0].clone(), wallets[2].clone()]);

        let err = store.remove_wallet("42", 2).await.unwrap_err();
        assert!(matches!(err, StoreError::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[tokio::test]
    async fn test_remove_for_unknown_user_is_out_of_range() {
        let store = store_with(Arc::new(MemoryStorage::new())).await;
        let err = store.remove_wallet("nobody", 0).await.unwrap_err();
        assert!(matches!(err, StoreError::IndexOutOfRange { index: 0, len: 0 }));
    }

    #[tokio::test]
    async fn test_wallet_limit_is_all_or_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let store = WalletCustodyStore::open(storage.clone(), 2).await.unwrap();
        store
            .add_wallet(&alice(), Wallet::import(KEY_1).unwrap())
            .await
            .unwrap();

        let batch = vec![Wallet::import(KEY_2).unwrap(), Wallet::import(KEY_3).unwrap()];
        let err = store.add_wallets(&alice(), batch).await.unwrap_err();

        assert!(matches!(err, StoreError::WalletLimitReached(2)));
        assert_eq!(store.wallet_count("42").await, 1);
        assert_eq!(storage.save_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_flush_rolls_back() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(storage.clone()).await;
        store
            .add_wallet(&alice(), Wallet::import(KEY_1).unwrap())
            .await
            .unwrap();

        storage.set_failing(true);
        let err = store
            .add_wallet(&alice(), Wallet::import(KEY_2).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert_eq!(store.wallet_count("42").await, 1);

        let err = store.remove_wallet("42", 0).await.unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert_eq!(store.wallet_count("42").await, 1);

        storage.set_failing(false);
        store.remove_wallet("42", 0).await.unwrap();
        assert_eq!(store.wallet_count("42").await, 0);
    }

    #[tokio::test]
    async fn test_update_settings() {
        let store = store_with(Arc::new(MemoryStorage::new())).await;

        let err = store.update_settings("42", |s| s.slippage = 2.0).await;
        assert!(matches!(err, Err(StoreError::UnknownUser(_))));

        store
            .add_wallet(&alice(), Wallet::import(KEY_1).unwrap())
            .await
            .unwrap();
        let settings = store
            .update_settings("42", |s| s.slippage = 2.0)
            .await
            .unwrap();
        assert_eq!(settings.slippage, 2.0);
        assert_eq!(store.settings("42").await.slippage, 2.0);
    }

    #[tokio::test]
    async fn test_default_settings_apply_to_new_users() {
        let custom = Settings {
            slippage: 3.0,
            ..Settings::default()
        };
        let store = store_with(Arc::new(MemoryStorage::new()))
            .await
            .with_default_settings(custom.clone());

        store
            .add_wallet(&alice(), Wallet::import(KEY_1).unwrap())
            .await
            .unwrap();
        assert_eq!(store.settings("42").await, custom);
    }

    #[tokio::test]
    async fn test_open_loads_existing_users() {
        let mut users = UserMap::new();
        users.insert(
            "7".to_string(),
            User::with_wallets(None, vec![Wallet::import(KEY_1).unwrap()], Settings::default()),
        );
        let storage = Arc::new(MemoryStorage::new().with_users(users));
        let store = store_with(storage).await;

        assert_eq!(store.user_count().await, 1);
        assert_eq!(store.total_wallets().await, 1);
    }

    #[tokio::test]
    async fn test_import_rejects_short_key() {
        let store = store_with(Arc::new(MemoryStorage::new())).await;

        assert!(matches!(
            store.import_wallet("0x01"),
            Err(StoreError::Wallet(WalletError::InvalidKeyFormat(_)))
        ));
    }
}
