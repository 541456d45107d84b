//! Command-line arguments.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use roll_aws::config::{DEFAULT_CREDENTIALS_FILE, DEFAULT_PROFILE};
use roll_aws::AwsSettings;
use roll_core::executor::DEFAULT_SHELL;
use roll_core::{FanOut, PollPolicy, RollSettings};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Compact human readable lines.
    Text,
}

/// aws-roll is a helper to remove an EC2 instance from an Elastic Load
/// Balancer while a command (such as a deployment script) is running, adding
/// the instance back into the ELB when the command finishes.
#[derive(Debug, Parser)]
#[command(name = "aws-roll")]
#[command(author, about, long_about = None, disable_version_flag = true)]
#[command(
    override_usage = "aws-roll [OPTIONS] <COMMAND>\n       aws-roll [OPTIONS] \"command-to-run && next command\""
)]
pub struct Cli {
    /// Command to run while the instance is out of service.
    ///
    /// Passed verbatim to `<shell> -c`.
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    /// Show version information.
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Shared AWS credentials file.
    #[arg(long, env = "AWS_SHARED_CREDENTIALS_FILE", default_value = DEFAULT_CREDENTIALS_FILE)]
    pub credentials_file: String,

    /// Profile within the credentials file.
    #[arg(long, env = "AWS_PROFILE", default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Region override (defaults to the instance's own region).
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Seconds between health polls.
    #[arg(
        long,
        env = "AWS_ROLL_POLL_INTERVAL",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval: u64,

    /// Seconds to wait for the instance to drain (0 waits forever).
    #[arg(long, env = "AWS_ROLL_DRAIN_TIMEOUT", default_value_t = 900)]
    pub drain_timeout: u64,

    /// Seconds to wait for the instance to become healthy (0 waits forever).
    #[arg(long, env = "AWS_ROLL_HEALTHY_TIMEOUT", default_value_t = 900)]
    pub healthy_timeout: u64,

    /// Query all load balancers at once instead of one after another.
    #[arg(long, env = "AWS_ROLL_CONCURRENT")]
    pub concurrent: bool,

    /// Shell used to run the command.
    #[arg(long, env = "AWS_ROLL_SHELL", default_value = DEFAULT_SHELL)]
    pub shell: String,

    /// Log output format.
    #[arg(long, env = "AWS_ROLL_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

/// What a parsed command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print version information.
    Version,
    /// No command given; print usage.
    Usage,
    /// Roll around this command.
    Roll(String),
}

impl Cli {
    /// `--version` wins over a command.
    pub fn invocation(&self) -> Invocation {
        if self.version {
            return Invocation::Version;
        }
        match &self.command {
            Some(command) => Invocation::Roll(command.clone()),
            None => Invocation::Usage,
        }
    }

    /// Orchestration settings derived from the flags.
    pub fn roll_settings(&self) -> RollSettings {
        let interval = Duration::from_secs(self.poll_interval);

        RollSettings {
            fan_out: if self.concurrent {
                FanOut::Concurrent
            } else {
                FanOut::Sequential
            },
            drain_poll: PollPolicy::unbounded(interval).with_timeout(budget(self.drain_timeout)),
            healthy_poll: PollPolicy::unbounded(interval)
                .with_timeout(budget(self.healthy_timeout)),
        }
    }

    pub fn aws_settings(&self) -> AwsSettings {
        AwsSettings {
            credentials_file: self.credentials_file.clone(),
            profile: self.profile.clone(),
        }
    }
}

fn budget(seconds: u64) -> Option<Duration> {
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_budget() {
        assert_eq!(budget(0), None);
        assert_eq!(budget(30), Some(Duration::from_secs(30)));
    }
}
