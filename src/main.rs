use ci_monitor::domain::errors::MonitorError;
use ci_monitor::infrastructures::adapters::primary::cli::{Cli, dispatch};
use ci_monitor::infrastructures::context::AppContext;
use ci_monitor::infrastructures::paths::MonitorPaths;
use ci_monitor::infrastructures::telemetry::init_tracing;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tracing::{info, info_span};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Unknown commands get the help text, not a failure.
        Err(e) if matches!(e.kind(), ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument) => {
            return print_help();
        }
        Err(e) => e.exit(),
    };
    let Some(command) = cli.command else {
        return print_help();
    };

    let daemon = command.is_daemon();
    let _telemetry = match init_tracing(if daemon { "info" } else { "warn" }, !daemon) {
        Ok(guard) => guard,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    let context = {
        let initialize_span = info_span!("initialize");
        let _enter = initialize_span.enter();
        info!("Application starting");
        AppContext::build(&MonitorPaths::from_env())
    };

    let result = match context {
        Ok(context) => dispatch(command, &context).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn print_help() -> ExitCode {
    if let Err(e) = Cli::command().print_help() {
        eprintln!("{e}");
    }
    ExitCode::SUCCESS
}

fn report(e: &anyhow::Error) {
    eprintln!("❌ {e:#}");
    if let Some(remedy) = e.downcast_ref::<MonitorError>().and_then(MonitorError::remedy) {
        eprintln!("   {remedy}");
    }
}
