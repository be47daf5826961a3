use algoscope::cli::{Cli, Commands};
use algoscope::commands::analyze::AnalyzeConfig;
use algoscope::exit_codes::{EXIT_INVALID_ARGS, EXIT_SUCCESS};
use algoscope::observability::{init_tracing, install_panic_hook};
use clap::Parser;

/// Exit codes: 0 success, 1 analysis failure, 2 usage or I/O error.
fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                EXIT_INVALID_ARGS
            } else {
                EXIT_SUCCESS
            };
            std::process::exit(code);
        }
    };

    // Logging first, so the panic hook has a subscriber to report to.
    init_tracing(cli.verbose);
    install_panic_hook();

    let result = match cli.command {
        Commands::Analyze {
            lang,
            file,
            format,
            output,
            config,
        } => algoscope::commands::analyze::analyze_file(AnalyzeConfig {
            language: lang,
            file,
            format,
            output,
            config,
        }),
        Commands::Init { force } => std::env::current_dir()
            .map_err(anyhow::Error::from)
            .and_then(|dir| algoscope::commands::init::init_config(&dir, force))
            .map(|()| EXIT_SUCCESS),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(EXIT_INVALID_ARGS);
        }
    }
}
