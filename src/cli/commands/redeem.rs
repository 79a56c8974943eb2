//! `qrvault redeem`: open a share link, consuming it.

use crate::cli::output;
use crate::cli::CliVault;
use crate::errors::{QrVaultError, Result};
use crate::share::token_from_input;

/// Execute the `redeem` command.
///
/// Integrity and storage failures are already logged in full by the
/// service; the person holding the link only sees the opaque message.
pub fn execute(service: &CliVault, input: &str, json: bool) -> Result<()> {
    let token = token_from_input(input);

    let view = service
        .redeem_share_token(token)
        .map_err(|e| match e {
            QrVaultError::Validation(_)
            | QrVaultError::TokenInvalidOrExpired
            | QrVaultError::NotFoundOrForbidden => e,
            other => QrVaultError::CommandFailed(other.public_message()),
        })?;

    if json {
        let out = serde_json::to_string_pretty(&view)
            .map_err(|e| QrVaultError::SerializationError(e.to_string()))?;
        println!("{out}");
    } else {
        output::print_credential_view(&view);
        output::warning("This link has now been used and cannot be opened again.");
    }

    Ok(())
}
