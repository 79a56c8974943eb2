//! AES-256-GCM envelope sealing.
//!
//! Each call to `seal` draws a fresh random 16-byte nonce and keeps the
//! authentication tag detached from the ciphertext, so the three parts
//! can be stored as separate fields.  `open` verifies the tag before any
//! plaintext leaves this module.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit, OsRng};
use aes_gcm::aes::Aes256;
use aes_gcm::{AeadCore, AesGcm};
use zeroize::Zeroize;

use crate::errors::{QrVaultError, Result};

use super::envelope::{Envelope, NONCE_LEN, TAG_LEN};
use super::keys::EncryptionKey;

/// AES-256-GCM with a 16-byte nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Seals and opens envelopes under one process-wide key.
///
/// Holds no state beyond the key, so a single instance can be shared
/// across threads.
#[derive(Debug)]
pub struct EnvelopeCipher {
    key: EncryptionKey,
}

impl EnvelopeCipher {
    /// Build a cipher around an already-validated key.
    pub fn new(key: EncryptionKey) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext` into an envelope.
    ///
    /// `None` short-circuits to `Envelope::Empty` without touching the
    /// cipher.  `Some("")` is a real value and gets sealed.
    pub fn seal(&self, plaintext: Option<&str>) -> Result<Envelope> {
        let Some(plaintext) = plaintext else {
            return Ok(Envelope::Empty);
        };

        let cipher = self.cipher()?;
        let nonce = Aes256Gcm16::generate_nonce(&mut OsRng);

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = cipher
            .encrypt_in_place_detached(&nonce, b"", &mut buffer)
            .map_err(|e| {
                buffer.zeroize();
                QrVaultError::EncryptionFailed(format!("encryption error: {e}"))
            })?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        nonce_bytes.copy_from_slice(&nonce);
        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(&tag);

        Ok(Envelope::Populated {
            ciphertext: buffer,
            nonce: nonce_bytes,
            tag: tag_bytes,
        })
    }

    /// Decrypt an envelope back to text.
    ///
    /// `Envelope::Empty` yields `""`.  A tag that does not verify against
    /// the ciphertext, nonce and key fails with `IntegrityError` and
    /// releases nothing.
    pub fn open(&self, envelope: &Envelope) -> Result<String> {
        let (ciphertext, nonce, tag) = match envelope {
            Envelope::Empty => return Ok(String::new()),
            Envelope::Populated {
                ciphertext,
                nonce,
                tag,
            } => (ciphertext, nonce, tag),
        };

        let cipher = self.cipher()?;
        let mut buffer = ciphertext.clone();
        if cipher
            .decrypt_in_place_detached(
                GenericArray::from_slice(nonce),
                b"",
                &mut buffer,
                GenericArray::from_slice(tag),
            )
            .is_err()
        {
            // The buffer may hold keystream-xored bytes; never let them out.
            buffer.zeroize();
            return Err(QrVaultError::IntegrityError);
        }

        String::from_utf8(buffer).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            QrVaultError::MalformedEnvelope("plaintext is not valid UTF-8".to_string())
        })
    }

    fn cipher(&self) -> Result<Aes256Gcm16> {
        Aes256Gcm16::new_from_slice(self.key.as_bytes())
            .map_err(|e| QrVaultError::ConfigError(format!("invalid key length: {e}")))
    }
}
