use clap::Parser;
use qrvault::cli::{commands, Cli, Commands};
use qrvault::errors::Result;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Keygen => commands::keygen::execute(),
        Commands::Completions { shell } => commands::completions::execute(shell),
        _ => run_with_vault(&cli),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        qrvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Commands that touch the vault read `.qrvault.toml` first; a broken
/// file stops them before anything else happens.
fn run_with_vault(cli: &Cli) -> Result<()> {
    let settings = qrvault::cli::load_settings()?;
    qrvault::logging::init_tracing(&settings.log_level);
    commands::execute_with_vault(cli, &settings)
}
