//! Cryptographic primitives for QrVault.
//!
//! This module provides:
//! - The `Envelope` at-rest representation of one sealed value (`envelope`)
//! - AES-256-GCM sealing and opening of envelopes (`cipher`)
//! - The process-wide `EncryptionKey` (`keys`)

pub mod cipher;
pub mod envelope;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{EnvelopeCipher, Envelope, EncryptionKey};
pub use cipher::EnvelopeCipher;
pub use envelope::{Envelope, HexParts, NONCE_LEN, TAG_LEN};
pub use keys::{EncryptionKey, ENCRYPTION_KEY_ENV, KEY_LEN};
