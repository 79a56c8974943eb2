//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{CredentialSummary, CredentialView};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of credential metadata (Id, Title, Expiry, Created).
pub fn print_credentials_table(credentials: &[CredentialSummary]) {
    if credentials.is_empty() {
        info("No credentials saved yet.");
        tip("Run `qrvault save <TITLE> --username <USER>` to add your first one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Title", "Expiry", "Created"]);

    for c in credentials {
        table.add_row(vec![
            c.id.to_string(),
            c.title.clone(),
            c.expiry
                .map(|e| e.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            c.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print a redeemed credential as a two-column table.
pub fn print_credential_view(view: &CredentialView) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Title", view.title.as_str()]);
    table.add_row(vec!["Username", view.username.as_str()]);
    table.add_row(vec!["Password", view.password.as_str()]);
    table.add_row(vec!["Notes", view.notes.as_str()]);
    let expiry = view
        .expiry
        .map(|e| e.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    table.add_row(vec!["Expiry", expiry.as_str()]);

    println!("{table}");
}
