use anyhow::Context;
use clap::Parser;
use satrec::cli::{self, Cli, Commands};
use satrec::config::AppConfig;
use satrec::coordinator::RunController;
use satrec::error::SatrecError;
use std::process::ExitCode;
use tracing::{error, info, warn};

mod main_runtime;

use main_runtime::{init_logging, init_logging_simple, shutdown_signal};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    config.validate()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let _guard = init_logging(&config.logging);
            run_mode(&config).await
        }
        Commands::Check { realm } => {
            init_logging_simple();
            let ok = cli::check_connection(&config, realm).await?;
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Recent {
            realm,
            days,
            category,
            json,
        } => {
            init_logging_simple();
            cli::show_recent(&config, realm, days, category.as_deref(), json).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_mode(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let controller = RunController::from_config(config)?;

    let report = tokio::select! {
        report = controller.run_once(&config.realms) => report,
        _ = shutdown_signal() => {
            warn!("Interrupted, abandoning run");
            return Err(SatrecError::Cancelled.into());
        }
    };

    for realm in &report.realms {
        info!(realm = realm.realm, file = %realm.file.display(), "{}", realm.outcome);
    }

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        error!(
            run_id = %report.run_id,
            failed = report.failure_count(),
            "{} of {} realms failed",
            report.failure_count(),
            report.realms.len()
        );
        Ok(ExitCode::FAILURE)
    }
}
