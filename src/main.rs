//! certgate: authenticated gateway in front of the certificate-management backend.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use certgate::config::load_config;
use certgate::lifecycle;
use certgate::observability::logging::init_logging;

#[derive(Debug, Parser)]
#[command(
    name = "certgate",
    version,
    about = "Authenticated API gateway for the certificate backend"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "certgate.toml")]
    config: PathBuf,

    /// Debug deployment: verbose logging, no HSTS on the redirect listener.
    #[arg(long)]
    debug: bool,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("certgate: {err}");
            return ExitCode::FAILURE;
        }
    };
    config.debug |= cli.debug;

    if cli.check {
        println!("{}: configuration OK", cli.config.display());
        return ExitCode::SUCCESS;
    }

    if let Err(err) = init_logging(&config.observability, config.debug) {
        eprintln!("certgate: failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        debug = config.debug,
        backend = %config.backend.base_url,
        "certgate starting"
    );

    match lifecycle::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Fatal error, exiting");
            ExitCode::FAILURE
        }
    }
}
