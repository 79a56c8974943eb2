//! Vault module: credential records and the sharing service.
//!
//! This module provides:
//! - `CredentialRecord`, `CredentialSummary` and `CredentialView` types (`credential`)
//! - `VaultService`, which saves, lists, shares and redeems credentials (`service`)

pub mod credential;
pub mod service;

// Re-export the most commonly used items.
pub use credential::{CredentialRecord, CredentialSummary, CredentialView, NewCredential};
pub use service::VaultService;
