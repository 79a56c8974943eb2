//! Single-use share tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use zeroize::Zeroize;

use crate::identity::{CredentialId, OwnerId};

/// How long a freshly issued token stays redeemable.
pub const TOKEN_TTL_SECONDS: i64 = 300;

/// Random bytes per token (256 bits, 43 base64url characters).
pub const TOKEN_BYTES: usize = 32;

/// A stored, not-yet-redeemed share token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareToken {
    /// The bearer value.  Unique across the store.
    pub token: String,

    /// The one credential this token opens.
    pub credential_id: CredentialId,

    /// Who issued it; must still own the credential at redemption.
    pub owner: OwnerId,

    /// Always `true`: tokens are consumed on first redemption.
    pub single_use: bool,

    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ShareToken {
    /// Mint a new token for `credential_id`, valid for `TOKEN_TTL_SECONDS`
    /// from `now`.
    pub fn issue(credential_id: CredentialId, owner: OwnerId, now: DateTime<Utc>) -> Self {
        Self {
            token: generate_token(),
            credential_id,
            owner,
            single_use: true,
            expires_at: now + Duration::seconds(TOKEN_TTL_SECONDS),
            created_at: now,
        }
    }

    /// A token is dead from its deadline onwards.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// What the issuer gets back.  Never contains plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub expiry_seconds: i64,
}

impl From<&ShareToken> for IssuedToken {
    fn from(record: &ShareToken) -> Self {
        Self {
            token: record.token.clone(),
            expires_at: record.expires_at,
            expiry_seconds: TOKEN_TTL_SECONDS,
        }
    }
}

/// Generate an unguessable URL-safe token string.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let token = URL_SAFE_NO_PAD.encode(bytes);
    bytes.zeroize();
    token
}
