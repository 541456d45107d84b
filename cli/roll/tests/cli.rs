//! Argument parsing and flag to settings mapping.

use std::time::Duration;

use aws_roll::error::{parse_exit_code, EXIT_USAGE};
use aws_roll::{Cli, Invocation, LogFormat};
use clap::error::ErrorKind;
use clap::Parser;
use rstest::rstest;
use roll_core::FanOut;

#[test]
fn test_command_is_optional() {
    let cli = Cli::try_parse_from(["aws-roll"]).unwrap();
    assert!(cli.command.is_none());
    assert!(!cli.version);
}

#[test]
fn test_command_is_taken_verbatim() {
    let cli = Cli::try_parse_from(["aws-roll", "make deploy && make verify"]).unwrap();
    assert_eq!(cli.command.as_deref(), Some("make deploy && make verify"));
}

#[rstest]
#[case("-v")]
#[case("--version")]
fn test_version_flag(#[case] flag: &str) {
    let cli = Cli::try_parse_from(["aws-roll", flag]).unwrap();
    assert!(cli.version);
}

#[test]
fn test_extra_positional_is_rejected() {
    let err = Cli::try_parse_from(["aws-roll", "echo", "hi"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownArgument);
}

#[test]
fn test_zero_poll_interval_is_rejected() {
    let err = Cli::try_parse_from(["aws-roll", "--poll-interval", "0", "true"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn test_roll_settings_from_flags() {
    let cli = Cli::try_parse_from([
        "aws-roll",
        "--poll-interval",
        "2",
        "--drain-timeout",
        "60",
        "--healthy-timeout",
        "0",
        "--concurrent",
        "true",
    ])
    .unwrap();

    let settings = cli.roll_settings();
    assert_eq!(settings.fan_out, FanOut::Concurrent);
    assert_eq!(settings.drain_poll.interval, Duration::from_secs(2));
    assert_eq!(settings.drain_poll.timeout, Some(Duration::from_secs(60)));
    assert_eq!(settings.healthy_poll.interval, Duration::from_secs(2));
    assert_eq!(settings.healthy_poll.timeout, None);
    assert!(!settings.healthy_poll.is_bounded());
}

#[test]
fn test_aws_settings_from_flags() {
    let cli = Cli::try_parse_from([
        "aws-roll",
        "--credentials-file",
        "/etc/aws/credentials",
        "--profile",
        "deploy",
        "true",
    ])
    .unwrap();

    let settings = cli.aws_settings();
    assert_eq!(settings.credentials_file, "/etc/aws/credentials");
    assert_eq!(settings.profile, "deploy");
}

#[rstest]
#[case("json", LogFormat::Json)]
#[case("text", LogFormat::Text)]
fn test_log_format(#[case] value: &str, #[case] expected: LogFormat) {
    let cli = Cli::try_parse_from(["aws-roll", "--log-format", value, "true"]).unwrap();
    assert_eq!(cli.log_format, expected);
}

#[rstest]
#[case(&["aws-roll"], Invocation::Usage)]
#[case(&["aws-roll", "-v"], Invocation::Version)]
#[case(&["aws-roll", "--version", "deploy.sh"], Invocation::Version)]
#[case(&["aws-roll", "deploy.sh"], Invocation::Roll("deploy.sh".to_string()))]
fn test_invocation(#[case] argv: &[&str], #[case] expected: Invocation) {
    let cli = Cli::try_parse_from(argv).unwrap();
    assert_eq!(cli.invocation(), expected);
}

#[rstest]
#[case(&["aws-roll", "--poll-interval", "0", "true"])]
#[case(&["aws-roll", "--poll-interval", "soon", "true"])]
#[case(&["aws-roll", "--log-format", "xml", "true"])]
#[case(&["aws-roll", "--no-such-flag"])]
fn test_rejected_arguments_exit_with_usage_code(#[case] argv: &[&str]) {
    let err = Cli::try_parse_from(argv).unwrap_err();
    assert_eq!(parse_exit_code(&err), EXIT_USAGE);
    assert_eq!(EXIT_USAGE, 1);
}

#[test]
fn test_help_exits_cleanly() {
    let err = Cli::try_parse_from(["aws-roll", "--help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    assert_eq!(parse_exit_code(&err), 0);
}
