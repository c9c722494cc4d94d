//! Key Vault
//!
//! AES-256-GCM sealing of private keys at rest. The cipher key is derived
//! with HKDF-SHA256 from a 32-byte master key; the wallet address is bound
//! as associated data so a sealed key only opens for its own address.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

/// Environment variable holding the hex master key
pub const MASTER_KEY_ENV: &str = "WALLET_MASTER_KEY";

const MASTER_KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const HKDF_SALT: &[u8] = b"monad-sniper/wallet-vault";
const HKDF_INFO: &[u8] = b"aes-256-gcm private keys v1";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Master key must be {expected} bytes of hex, got {actual} bytes")]
    InvalidMasterKey { expected: usize, actual: usize },

    #[error("Master key is not valid hex")]
    MasterKeyNotHex,

    #[error("Master key not set (export {0})")]
    MissingMasterKey(&'static str),

    #[error("Sealed key is malformed: {0}")]
    Malformed(String),

    #[error("Sealed key failed authentication")]
    Authentication,

    #[error("Entropy source failure: {0}")]
    Entropy(String),
}

/// Seals and opens private keys
pub struct KeyVault {
    cipher: Aes256Gcm,
}

impl KeyVault {
    pub fn from_master_key(master: &[u8]) -> Result<Self, VaultError> {
        if master.len() != MASTER_KEY_LEN {
            return Err(VaultError::InvalidMasterKey {
                expected: MASTER_KEY_LEN,
                actual: master.len(),
            });
        }

        let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), master);
        let mut okm = Zeroizing::new([0u8; 32]);
        hk.expand(HKDF_INFO, &mut okm[..])
            .map_err(|_| VaultError::InvalidMasterKey {
                expected: MASTER_KEY_LEN,
                actual: master.len(),
            })?;

        let cipher = Aes256Gcm::new_from_slice(&okm[..]).map_err(|_| {
            VaultError::InvalidMasterKey {
                expected: MASTER_KEY_LEN,
                actual: okm.len(),
            }
        })?;
        Ok(Self { cipher })
    }

    /// Parse a hex master key (optional `0x`)
    pub fn from_hex(hex_key: &str) -> Result<Self, VaultError> {
        let trimmed = hex_key.trim();
        let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(hex::decode(body).map_err(|_| VaultError::MasterKeyNotHex)?);
        Self::from_master_key(&bytes)
    }

    /// Read the master key from `WALLET_MASTER_KEY`
    pub fn from_env() -> Result<Self, VaultError> {
        let value = Zeroizing::new(
            std::env::var(MASTER_KEY_ENV).map_err(|_| VaultError::MissingMasterKey(MASTER_KEY_ENV))?,
        );
        Self::from_hex(&value)
    }

    /// Fresh random master key as hex, for `gen-master-key`
    pub fn generate_master_key() -> Result<String, VaultError> {
        let mut bytes = Zeroizing::new([0u8; MASTER_KEY_LEN]);
        OsRng
            .try_fill_bytes(&mut bytes[..])
            .map_err(|e| VaultError::Entropy(e.to_string()))?;
        Ok(hex::encode(&bytes[..]))
    }

    /// Encrypt `secret` for `address`; output is `base64(nonce || ciphertext)`
    pub fn seal(&self, address: &str, secret: &str) -> Result<String, VaultError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| VaultError::Entropy(e.to_string()))?;

        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: secret.as_bytes(),
                    aad: address.to_ascii_lowercase().as_bytes(),
                },
            )
            .map_err(|_| VaultError::Malformed("encryption failed".to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(out))
    }

    pub fn open(&self, address: &str, sealed: &str) -> Result<Zeroizing<String>, VaultError> {
        let raw = BASE64
            .decode(sealed.trim())
            .map_err(|e| VaultError::Malformed(e.to_string()))?;
        if raw.len() <= NONCE_LEN {
            return Err(VaultError::Malformed(format!("{} bytes", raw.len())));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        let plain = Zeroizing::new(
            self.cipher
                .decrypt(
                    Nonce::from_slice(nonce),
                    Payload {
                        msg: ciphertext,
                        aad: address.to_ascii_lowercase().as_bytes(),
                    },
                )
                .map_err(|_| VaultError::Authentication)?,
        );

        let text = std::str::from_utf8(&plain)
            .map_err(|_| VaultError::Malformed("plaintext is not UTF-8".to_string()))?;
        Ok(Zeroizing::new(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    const ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";
    const SECRET: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn test_seal_then_open() {
        let vault = KeyVault::from_hex(MASTER).unwrap();
        let sealed = vault.seal(ADDRESS, SECRET).unwrap();
        assert!(!sealed.contains(SECRET));
        assert_eq!(vault.open(ADDRESS, &sealed).unwrap().as_str(), SECRET);
    }

    #[test]
    fn test_nonce_is_fresh_per_seal() {
        let vault = KeyVault::from_hex(MASTER).unwrap();
        assert_ne!(vault.seal(ADDRESS, SECRET).unwrap(), vault.seal(ADDRESS, SECRET).unwrap());
    }

    #[test]
    fn test_address_is_bound() {
        let vault = KeyVault::from_hex(MASTER).unwrap();
        let sealed = vault.seal(ADDRESS, SECRET).unwrap();
        let other = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(vault.open(other, &sealed), Err(VaultError::Authentication));
        // case of the address does not matter
        assert!(vault.open(&ADDRESS.to_ascii_lowercase(), &sealed).is_ok());
    }

    #[test]
    fn test_wrong_master_key_fails() {
        let vault = KeyVault::from_hex(MASTER).unwrap();
        let sealed = vault.seal(ADDRESS, SECRET).unwrap();

        let other = KeyVault::from_hex(&"ab".repeat(32)).unwrap();
        assert_eq!(other.open(ADDRESS, &sealed), Err(VaultError::Authentication));
    }

    #[test]
    fn test_bad_master_keys() {
        assert!(matches!(
            KeyVault::from_hex("abcd"),
            Err(VaultError::InvalidMasterKey { actual: 2, .. })
        ));
        assert!(matches!(KeyVault::from_hex("xyz"), Err(VaultError::MasterKeyNotHex)));
    }

    #[test]
    fn test_malformed_sealed_value() {
        let vault = KeyVault::from_hex(MASTER).unwrap();
        assert!(matches!(vault.open(ADDRESS, "not base64!"), Err(VaultError::Malformed(_))));
        assert!(matches!(vault.open(ADDRESS, "AAAA"), Err(VaultError::Malformed(_))));
    }

    #[test]
    fn test_generated_master_key_is_usable() {
        let key = KeyVault::generate_master_key().unwrap();
        assert_eq!(key.len(), 64);
        assert!(KeyVault::from_hex(&key).is_ok());
    }
}
