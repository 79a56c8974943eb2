//! `qrvault list`: display the caller's credentials in a table.

use crate::cli::output;
use crate::cli::{require_owner, Cli, CliVault};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, service: &CliVault) -> Result<()> {
    let owner = require_owner(cli)?;
    let credentials = service.list_credentials(&owner)?;

    output::info(&format!("{owner}: {} credential(s)", credentials.len()));
    output::print_credentials_table(&credentials);

    Ok(())
}
