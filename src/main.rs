//! mmc-pack-updater entry point.

use clap::Parser;
use mmcpu::cli::{commands, usage_error, Cli};
use mmcpu::error::Error;
use std::io::IsTerminal;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let usage = usage_error(&e);
            report(&usage);
            return ExitCode::from(usage.exit_code());
        }
    };

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match commands::update::execute(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn report(e: &Error) {
    if let Error::Usage(usage) = e {
        eprintln!("{usage}");
    } else if let Some(hint) = e.hint() {
        eprintln!("Error: {e}\n  Hint: {hint}");
    } else {
        eprintln!("Error: {e}");
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    // Honor RUST_LOG if set, otherwise only warnings
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
