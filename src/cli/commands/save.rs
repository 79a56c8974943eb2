//! `qrvault save`: encrypt and store a credential.

use std::io::{self, IsTerminal, Read};

use zeroize::{Zeroize, Zeroizing};

use crate::cli::output;
use crate::cli::{parse_expiry, require_owner, Cli, CliVault};
use crate::errors::{QrVaultError, Result};
use crate::vault::NewCredential;

/// Arguments of the `save` command, borrowed from the parsed CLI.
pub struct SaveArgs<'a> {
    pub title: &'a str,
    pub username: &'a str,
    pub password: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub expiry: Option<&'a str>,
}

/// Execute the `save` command.
pub fn execute(cli: &Cli, service: &CliVault, args: SaveArgs<'_>) -> Result<()> {
    let owner = require_owner(cli)?;

    let expiry = args.expiry.map(parse_expiry).transpose()?;

    // Determine the password from one of three sources.
    let password = if let Some(p) = args.password {
        // Source 1: Inline value on the command line.
        output::warning("Password provided on command line; it may appear in shell history.");
        Zeroizing::new(p.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        Zeroizing::new(buf.trim_end().to_string())
    } else {
        // Source 3: Interactive secure prompt (default).
        let pw = dialoguer::Password::new()
            .with_prompt(format!("Password for {}", args.title))
            .interact()
            .map_err(|e| QrVaultError::CommandFailed(format!("password prompt: {e}")))?;
        Zeroizing::new(pw)
    };

    let mut input = NewCredential {
        title: args.title.to_string(),
        username: args.username.to_string(),
        password: password.to_string(),
        notes: args.notes.map(str::to_string),
        expiry,
    };

    let saved = service.save_credential(&owner, &input);
    let title = input.title.trim().to_string();
    input.zeroize();
    let id = saved?;

    output::success(&format!("Credential '{title}' saved"));
    println!("{id}");
    output::tip(&format!("Share it once: qrvault share {id}"));

    Ok(())
}
