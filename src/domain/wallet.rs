//! Wallet Key Pairs
//!
//! secp256k1 key generation and import with EVM address derivation.

use std::fmt;

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use sha3::{Digest, Keccak256};
use thiserror::Error;
use zeroize::Zeroizing;

use super::address::{short_address, to_checksum_address};

/// Hex length of a raw 32-byte private key
pub const PRIVATE_KEY_HEX_LEN: usize = 64;

/// Attempts before giving up on drawing a valid scalar
const MAX_GENERATION_ATTEMPTS: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Invalid private key format: {0}")]
    InvalidKeyFormat(String),
    #[error("Entropy source failure: {0}")]
    EntropyFailure(String),
}

/// A custodial key pair. The private key is wiped from memory on drop.
#[derive(Clone)]
pub struct Wallet {
    address: String,
    private_key: Zeroizing<String>,
}

impl Wallet {
    /// Generate a fresh key pair from the OS random source
    pub fn generate() -> Result<Self, WalletError> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let mut bytes = Zeroizing::new([0u8; 32]);
            OsRng
                .try_fill_bytes(&mut bytes[..])
                .map_err(|e| WalletError::EntropyFailure(e.to_string()))?;

            // zero or >= curve order; draw again
            if let Ok(wallet) = Self::from_key_bytes(&bytes[..]) {
                return Ok(wallet);
            }
        }
        Err(WalletError::EntropyFailure(
            "could not draw a valid secp256k1 scalar".to_string(),
        ))
    }

    /// Import a hex private key, with or without the `0x` prefix
    pub fn import(raw: &str) -> Result<Self, WalletError> {
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        if body.len() != PRIVATE_KEY_HEX_LEN {
            return Err(WalletError::InvalidKeyFormat(format!(
                "expected {} hex characters, got {}",
                PRIVATE_KEY_HEX_LEN,
                body.len()
            )));
        }

        let bytes = Zeroizing::new(
            hex::decode(body).map_err(|e| WalletError::InvalidKeyFormat(e.to_string()))?,
        );
        Self::from_key_bytes(&bytes)
    }

    /// Rebuild a wallet from stored parts, checking the key still derives the address
    pub fn restore(address: &str, private_key: &str) -> Result<Self, WalletError> {
        let wallet = Self::import(private_key)?;
        if !wallet.address.eq_ignore_ascii_case(address) {
            return Err(WalletError::InvalidKeyFormat(format!(
                "key does not derive stored address {}",
                short_address(address)
            )));
        }
        Ok(wallet)
    }

    fn from_key_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let signing_key = SigningKey::from_slice(bytes).map_err(|_| {
            WalletError::InvalidKeyFormat("not a valid secp256k1 private key".to_string())
        })?;

        let point = signing_key.verifying_key().to_encoded_point(false);
        let digest = Keccak256::digest(&point.as_bytes()[1..]);
        let address = to_checksum_address(&hex::encode(&digest[12..]));

        Ok(Self {
            address,
            private_key: Zeroizing::new(hex::encode(bytes)),
        })
    }

    /// Checksummed `0x` address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Lowercase hex private key without prefix (secret)
    pub fn private_key(&self) -> &str {
        self.private_key.as_str()
    }

    pub fn short_address(&self) -> String {
        short_address(&self.address)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl PartialEq for Wallet {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}
