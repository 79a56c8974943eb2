use thiserror::Error;

/// All errors that can occur in QrVault.
///
/// Several variants deliberately collapse distinct causes into one outcome
/// (`NotFoundOrForbidden`, `TokenInvalidOrExpired`) so a caller cannot probe
/// for records belonging to someone else.
#[derive(Debug, Error)]
pub enum QrVaultError {
    // --- Request errors ---
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Credential not found or access denied")]
    NotFoundOrForbidden,

    #[error("Token invalid, already used, or expired")]
    TokenInvalidOrExpired,

    // --- Crypto errors ---
    #[error("Integrity check failed: stored secret is corrupted, tampered with, or sealed under another key")]
    IntegrityError,

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // --- Config errors ---
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // --- Store errors ---
    #[error("Storage error: {0}")]
    Storage(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl QrVaultError {
    /// Message safe to show to whoever presented a share token.
    ///
    /// Integrity, envelope and storage failures carry operator detail that
    /// must stay in the logs, so they all render as the same opaque text.
    pub fn public_message(&self) -> String {
        match self {
            Self::IntegrityError
            | Self::MalformedEnvelope(_)
            | Self::EncryptionFailed(_)
            | Self::Storage(_) => "Failed to open token.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<rusqlite::Error> for QrVaultError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Convenience type alias for QrVault results.
pub type Result<T> = std::result::Result<T, QrVaultError>;
