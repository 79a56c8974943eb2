//! `qrvault purge`: sweep expired share tokens out of the database.

use crate::cli::output;
use crate::cli::CliVault;
use crate::errors::Result;

/// Execute the `purge` command.
pub fn execute(service: &CliVault) -> Result<()> {
    let removed = service.purge_expired_tokens()?;
    output::success(&format!("Removed {removed} expired share token(s)"));
    Ok(())
}
