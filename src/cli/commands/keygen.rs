//! `qrvault keygen`: print a fresh encryption key.

use crate::cli::output;
use crate::crypto::{EncryptionKey, ENCRYPTION_KEY_ENV};
use crate::errors::Result;

/// Execute the `keygen` command.
pub fn execute() -> Result<()> {
    let key = EncryptionKey::generate();
    println!("{}", key.to_hex().as_str());
    output::tip(&format!(
        "Export it as {ENCRYPTION_KEY_ENV}. Losing it makes every stored credential unreadable."
    ));
    Ok(())
}
