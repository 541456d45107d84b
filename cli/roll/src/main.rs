//! aws-roll binary.

use std::process::ExitCode;

use aws_roll::{app, error, logging, version, Cli, Invocation};
use clap::{CommandFactory, Parser};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(error::parse_exit_code(&e));
        }
    };

    let command = match cli.invocation() {
        Invocation::Version => {
            println!("{}", version::detailed());
            return ExitCode::SUCCESS;
        }
        Invocation::Usage => {
            let _ = Cli::command().write_help(&mut std::io::stderr());
            return ExitCode::from(error::EXIT_USAGE);
        }
        Invocation::Roll(command) => command,
    };

    if let Err(e) = logging::init(cli.log_format) {
        eprintln!("failed to initialize logging: {e}");
    }

    info!(version = %version::short(), "starting aws-roll");

    match app::roll(&cli, &command).await {
        Ok(report) => {
            info!(
                instance_id = %report.instance.id,
                load_balancers = %report.load_balancers,
                command_succeeded = report.command.is_success(),
                drain_attempts = report.drain_attempts,
                healthy_attempts = report.healthy_attempts,
                "roll complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            warn!(error = %e, "roll aborted");
            error::print_error(&e);
            ExitCode::from(error::exit_code(&e))
        }
    }
}
