// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, run the workflow, print the report.
// - Every failure ends up as one `Error: ...` line on stderr and exit code 1.

use std::process::ExitCode;

use clap::Parser;
use fraenk_cli::cli::{self, Args};
use fraenk_cli::ui::Ui;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Diagnostics go to stderr so `--json` output stays clean. Use
    // RUST_LOG=fraenk_cli=debug to see request logs.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let result = cli::run(&args).and_then(|report| Ui::new(args.json, args.quiet).print_report(&report));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // `{:#}` keeps the whole context chain on one line.
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
