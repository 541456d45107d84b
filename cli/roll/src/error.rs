//! Error display and exit codes for the CLI.

use clap::error::ErrorKind;
use colored::Colorize;
use roll_core::error::EXIT_IDENTITY;
use roll_core::RollError;

/// Exit code for usage errors: no command, or arguments clap rejects.
pub const EXIT_USAGE: u8 = 1;

/// Exit code after clap declined to parse the arguments.
///
/// Help output is not a failure.
pub fn parse_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_USAGE,
    }
}

/// Exit code for failures that end the run.
///
/// Setup failures that are not a [`RollError`] (credentials, configuration)
/// share the identity code since both happen before any load balancer is
/// touched.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<RollError>()
        .map(RollError::exit_code)
        .unwrap_or(EXIT_IDENTITY)
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    let Some(roll_err) = err.downcast_ref::<RollError>() else {
        return;
    };

    let hint = match roll_err {
        RollError::NotAssigned { .. } => {
            "Hint: Nothing to drain. Register the instance with a load balancer or run the command directly."
        }
        RollError::Identity(_) => {
            "Hint: aws-roll must run on an EC2 instance with access to the instance metadata service and ec2:DescribeInstances."
        }
        RollError::PollTimeout { .. } => {
            "Hint: Raise --drain-timeout or --healthy-timeout (0 waits forever) and check the load balancer health check."
        }
    };

    eprintln!("\n{}", hint.yellow());
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use roll_core::{IdentityError, InstanceId, Phase};

    use super::*;

    #[test]
    fn test_exit_code_from_roll_error() {
        let err = anyhow::Error::new(RollError::NotAssigned {
            instance_id: InstanceId::from("i-1"),
        });
        assert_eq!(exit_code(&err), 2);

        let err = anyhow::Error::new(RollError::PollTimeout {
            phase: Phase::AwaitHealthy,
            attempts: 3,
            elapsed: Duration::from_secs(10),
        });
        assert_eq!(exit_code(&err), 4);

        let err = anyhow::Error::new(RollError::Identity(IdentityError::Metadata(
            "timeout".into(),
        )));
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn test_exit_code_through_context() {
        let err = anyhow::Error::new(RollError::NotAssigned {
            instance_id: InstanceId::from("i-1"),
        })
        .context("roll failed");
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_exit_code_for_setup_failure() {
        let err = anyhow::anyhow!("no home directory");
        assert_eq!(exit_code(&err), 3);
    }
}
