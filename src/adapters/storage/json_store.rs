//! JSON User Store
//!
//! Persists the whole user map to a single JSON file. Private keys are
//! sealed with the [`KeyVault`] before they touch disk. Writes go to a
//! sibling temp file that is renamed over the target.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::vault::KeyVault;
use crate::domain::{Settings, User, Wallet};
use crate::ports::{StorageError, UserMap, UserStorage};

/// Default users file name
pub const DEFAULT_USERS_FILE: &str = "users.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    wallets: Vec<WalletRecord>,
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WalletRecord {
    address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encrypted_key: Option<String>,
    /// Legacy plaintext layout; read but never written
    #[serde(default, skip_serializing)]
    private_key: Option<String>,
}

/// File-backed [`UserStorage`]
pub struct JsonFileStore {
    path: PathBuf,
    vault: KeyVault,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, vault: KeyVault) -> Self {
        Self {
            path: path.into(),
            vault,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_USERS_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn decode(&self, records: BTreeMap<String, UserRecord>) -> Result<UserMap, StorageError> {
        let mut users = UserMap::new();
        let mut legacy = 0usize;

        for (user_id, record) in records {
            let mut wallets = Vec::with_capacity(record.wallets.len());
            for wallet in record.wallets {
                let corrupted = |reason: String| StorageError::Corrupted {
                    user: user_id.clone(),
                    reason,
                };

                let restored = match (&wallet.private_key, &wallet.encrypted_key) {
                    (Some(plain), _) => {
                        legacy += 1;
                        Wallet::restore(&wallet.address, plain)
                    }
                    (None, Some(sealed)) => {
                        let plain = self
                            .vault
                            .open(&wallet.address, sealed)
                            .map_err(|e| corrupted(format!("{}: {}", wallet.address, e)))?;
                        Wallet::restore(&wallet.address, &plain)
                    }
                    (None, None) => {
                        return Err(corrupted(format!("{} has no key material", wallet.address)))
                    }
                };
                wallets.push(restored.map_err(|e| corrupted(e.to_string()))?);
            }

            users.insert(
                user_id,
                User::with_wallets(record.username, wallets, record.settings),
            );
        }

        if legacy > 0 {
            tracing::warn!(
                "Loaded {} plaintext private keys; they will be sealed on the next save",
                legacy
            );
        }
        Ok(users)
    }

    fn encode(&self, users: &UserMap) -> Result<BTreeMap<String, UserRecord>, StorageError> {
        users
            .iter()
            .map(|(user_id, user)| {
                let wallets = user
                    .wallets()
                    .iter()
                    .map(|wallet| {
                        let sealed = self
                            .vault
                            .seal(wallet.address(), wallet.private_key())
                            .map_err(|e| StorageError::Vault(e.to_string()))?;
                        Ok(WalletRecord {
                            address: wallet.address().to_string(),
                            encrypted_key: Some(sealed),
                            private_key: None,
                        })
                    })
                    .collect::<Result<Vec<_>, StorageError>>()?;

                Ok((
                    user_id.clone(),
                    UserRecord {
                        username: user.username.clone(),
                        wallets,
                        settings: user.settings.clone(),
                    },
                ))
            })
            .collect()
    }
}

#[async_trait]
impl UserStorage for JsonFileStore {
    async fn load(&self) -> Result<UserMap, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No user store at {:?}, starting empty", self.path);
                return Ok(UserMap::new());
            }
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };

        if content.trim().is_empty() {
            return Ok(UserMap::new());
        }

        let records: BTreeMap<String, UserRecord> = serde_json::from_str(&content)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let users = self.decode(records)?;

        tracing::info!("Loaded {} users from {:?}", users.len(), self.path);
        Ok(users)
    }

    async fn save(&self, users: &UserMap) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::Io(e.to_string()))?;
            }
        }

        let records = self.encode(users)?;
        let content = serde_json::to_string_pretty(&records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, content)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&temp, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }

        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!("Saved {} users to {:?}", users.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GasTier;
    use tempfile::tempdir;

    const MASTER: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    fn store(path: &Path) -> JsonFileStore {
        JsonFileStore::new(path, KeyVault::from_hex(MASTER).unwrap())
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let users = store(&dir.path().join("users.json")).load().await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("users.json");
        let store = store(&path);

        let mut user = User::new(Some("alice".to_string()));
        user.push_wallet(Wallet::import(KEY_ONE).unwrap());
        user.push_wallet(Wallet::generate().unwrap());
        user.settings.gas_tier = GasTier::Fast;

        let mut users = UserMap::new();
        users.insert("1001".to_string(), user.clone());
        store.save(&users).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains(KEY_ONE), "private key written in plaintext");
        assert!(raw.contains("encrypted_key"));
        assert!(!store.temp_path().exists());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.get("1001"), Some(&user));
    }

    #[tokio::test]
    async fn test_legacy_plaintext_records_are_resealed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let legacy = format!(
            r#"{{"42": {{"username": "bob", "wallets": [
                {{"address": "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
                  "private_key": "{}", "encrypted_key": "encrypted_{}"}}],
                "settings": {{"slippage": 1.0, "auto_slippage": false, "gas_settings": "standard"}}}}}}"#,
            KEY_ONE, KEY_ONE
        );
        std::fs::write(&path, legacy).unwrap();

        let store = store(&path);
        let users = store.load().await.unwrap();
        assert_eq!(users["42"].wallet(0).unwrap().private_key(), KEY_ONE);

        store.save(&users).await.unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains(KEY_ONE));
        assert_eq!(store.load().await.unwrap(), users);
    }

    #[tokio::test]
    async fn test_wrong_master_key_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");

        let mut user = User::new(None);
        user.push_wallet(Wallet::import(KEY_ONE).unwrap());
        let mut users = UserMap::new();
        users.insert("7".to_string(), user);
        store(&path).save(&users).await.unwrap();

        let other = JsonFileStore::new(&path, KeyVault::from_hex(&"cd".repeat(32)).unwrap());
        let result = other.load().await;
        assert!(matches!(result, Err(StorageError::Corrupted { .. })));
    }

    #[tokio::test]
    async fn test_garbage_file_is_a_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = store(&path).load().await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
