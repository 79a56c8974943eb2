//! The process-wide encryption key.
//!
//! The key arrives from the deployment environment as 64 hex characters
//! (32 bytes) and is validated once at start-up.  Anything else is a
//! deployment error and refuses to load.

use std::fmt;

use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{QrVaultError, Result};

/// Length of the AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Environment variable holding the hex-encoded key.
pub const ENCRYPTION_KEY_ENV: &str = "QRVAULT_ENCRYPTION_KEY";

/// A 32-byte encryption key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN],
}

impl EncryptionKey {
    /// Create a key from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate a fresh random key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        let key = Self::new(bytes);
        bytes.zeroize();
        key
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        if encoded.len() != KEY_LEN * 2 {
            return Err(QrVaultError::ConfigError(format!(
                "encryption key must be a {}-character hex string ({KEY_LEN} bytes), got {} characters",
                KEY_LEN * 2,
                encoded.len()
            )));
        }

        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(encoded, &mut bytes).map_err(|e| {
            QrVaultError::ConfigError(format!("encryption key is not valid hex: {e}"))
        })?;

        let key = Self::new(bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// Load the key from `QRVAULT_ENCRYPTION_KEY`.
    ///
    /// A missing or empty variable is a configuration error, same as a
    /// malformed one.
    pub fn from_env() -> Result<Self> {
        let value = Zeroizing::new(std::env::var(ENCRYPTION_KEY_ENV).unwrap_or_default());
        if value.trim().is_empty() {
            return Err(QrVaultError::ConfigError(format!(
                "{ENCRYPTION_KEY_ENV} is not set (generate one with `qrvault keygen`)"
            )));
        }
        Self::from_hex(&value).map_err(|e| match e {
            QrVaultError::ConfigError(msg) => {
                QrVaultError::ConfigError(format!("{ENCRYPTION_KEY_ENV}: {msg}"))
            }
            other => other,
        })
    }

    /// Hex-encode the key (for `qrvault keygen`).
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes))
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}
