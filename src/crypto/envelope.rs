//! The at-rest form of one encrypted text field.
//!
//! An envelope is either empty ("nothing stored", used for optional
//! notes) or carries the ciphertext, the nonce it was sealed under, and
//! the GCM authentication tag.  Stores keep the three parts as separate
//! hex text fields; `from_hex_parts` is the only way back in and rejects
//! anything partially populated.

use crate::errors::{QrVaultError, Result};

/// Nonce length in bytes (AES-GCM with a 16-byte IV).
pub const NONCE_LEN: usize = 16;

/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// One sealed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// No value was stored.
    Empty,

    /// A sealed value.  `ciphertext` is empty when the plaintext was `""`.
    Populated {
        ciphertext: Vec<u8>,
        nonce: [u8; NONCE_LEN],
        tag: [u8; TAG_LEN],
    },
}

/// Hex text form of an envelope: `(content, iv, auth_tag)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HexParts {
    pub content: String,
    pub iv: String,
    pub auth_tag: String,
}

impl Envelope {
    /// Returns `true` for the "nothing stored" envelope.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Encode each part as lowercase hex.  `Empty` encodes as three empty strings.
    pub fn to_hex_parts(&self) -> HexParts {
        match self {
            Self::Empty => HexParts::default(),
            Self::Populated {
                ciphertext,
                nonce,
                tag,
            } => HexParts {
                content: hex::encode(ciphertext),
                iv: hex::encode(nonce),
                auth_tag: hex::encode(tag),
            },
        }
    }

    /// Rebuild an envelope from its stored hex parts.
    ///
    /// All three empty yields `Empty`.  Otherwise the iv and tag must both
    /// be present and decode to their fixed lengths; the content may be
    /// empty.  Anything in between is `MalformedEnvelope`.
    pub fn from_hex_parts(content: &str, iv: &str, auth_tag: &str) -> Result<Self> {
        if content.is_empty() && iv.is_empty() && auth_tag.is_empty() {
            return Ok(Self::Empty);
        }

        if iv.is_empty() || auth_tag.is_empty() {
            return Err(QrVaultError::MalformedEnvelope(
                "missing iv or authentication tag".into(),
            ));
        }

        let ciphertext = hex::decode(content)
            .map_err(|e| QrVaultError::MalformedEnvelope(format!("content: {e}")))?;
        let nonce = decode_fixed::<NONCE_LEN>("iv", iv)?;
        let tag = decode_fixed::<TAG_LEN>("auth tag", auth_tag)?;

        Ok(Self::Populated {
            ciphertext,
            nonce,
            tag,
        })
    }
}

fn decode_fixed<const N: usize>(field: &str, encoded: &str) -> Result<[u8; N]> {
    if encoded.len() != N * 2 {
        return Err(QrVaultError::MalformedEnvelope(format!(
            "{field} must be {} hex characters, got {}",
            N * 2,
            encoded.len()
        )));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(encoded, &mut out)
        .map_err(|e| QrVaultError::MalformedEnvelope(format!("{field}: {e}")))?;
    Ok(out)
}
