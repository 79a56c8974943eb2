//! `qrvault share`: issue a single-use link for one credential.

use crate::cli::output;
use crate::cli::{require_owner, Cli, CliVault};
use crate::config::Settings;
use crate::errors::Result;
use crate::identity::CredentialId;
use crate::share::render_qr;

/// Execute the `share` command.
pub fn execute(
    cli: &Cli,
    settings: &Settings,
    service: &CliVault,
    credential_id: &str,
    no_qr: bool,
) -> Result<()> {
    let owner = require_owner(cli)?;
    let credential_id: CredentialId = credential_id.parse()?;

    let issued = service.issue_share_token(&owner, &credential_id)?;
    let url = settings.share_url(&issued.token);

    if !no_qr {
        println!("{}", render_qr(&url)?);
    }
    println!("{url}");

    output::info(&format!(
        "Link works once and expires at {} ({}s)",
        issued.expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
        issued.expiry_seconds
    ));

    Ok(())
}
