use bunenv::cli::Cli;
use bunenv::config::Config;
use bunenv::platform::PlatformKey;
use bunenv::settings::Settings;
use bunenv::{commands, logging};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> ExitCode {
    // Used to regenerate the README; handled before any other parsing
    if std::env::args().any(|arg| arg == "--dump-config-defaults") {
        println!("{}", Config::default().dump());
        return ExitCode::SUCCESS;
    }

    let cli = Cli::parse();
    logging::init(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> bunenv::Result<()> {
    let config_files = cli.config_files().unwrap_or_else(|e| e.exit());
    let cwd = std::env::current_dir()?;
    let config = Config::load(&config_files, cli.verbose, &cwd)?.merge_cli(&cli);
    cli.validate().unwrap_or_else(|e| e.exit());

    let settings = Settings::new(config, &cli, PlatformKey::detect());
    debug!(
        "Bun {} for {}-{}",
        settings.bun, settings.platform.os, settings.platform.arch
    );

    commands::run(settings).await
}
