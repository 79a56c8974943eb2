//! Subcommand implementations.

pub mod completions;
pub mod keygen;
pub mod list;
pub mod purge;
pub mod redeem;
pub mod save;
pub mod share;

use crate::cli::{open_service, Cli, Commands};
use crate::config::Settings;
use crate::errors::{QrVaultError, Result};

/// Open the vault once and run a command that needs it.
pub fn execute_with_vault(cli: &Cli, settings: &Settings) -> Result<()> {
    let service = open_service(cli, settings)?;

    match &cli.command {
        Commands::Save {
            title,
            username,
            password,
            notes,
            expiry,
        } => save::execute(
            cli,
            &service,
            save::SaveArgs {
                title,
                username,
                password: password.as_deref(),
                notes: notes.as_deref(),
                expiry: expiry.as_deref(),
            },
        ),
        Commands::List => list::execute(cli, &service),
        Commands::Share {
            credential_id,
            no_qr,
        } => share::execute(cli, settings, &service, credential_id, *no_qr),
        Commands::Redeem { token, json } => redeem::execute(&service, token, *json),
        Commands::Purge => purge::execute(&service),
        Commands::Keygen | Commands::Completions { .. } => Err(QrVaultError::CommandFailed(
            "this command does not use the vault".into(),
        )),
    }
}
