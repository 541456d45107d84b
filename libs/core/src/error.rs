//! Error types for the roll orchestration.

use std::time::Duration;

use thiserror::Error;

use crate::orchestrator::Phase;
use crate::types::InstanceId;

/// Process exit code for a run that found no load balancers.
pub const EXIT_NOT_ASSIGNED: u8 = 2;

/// Process exit code for a run whose instance could not be identified.
pub const EXIT_IDENTITY: u8 = 3;

/// Process exit code for a run that exhausted a poll budget.
pub const EXIT_POLL_TIMEOUT: u8 = 4;

/// Failures that end a run.
///
/// Single load balancer failures never show up here; the controller turns
/// them into "condition not met yet" and the poll loops retry.
#[derive(Debug, Error)]
pub enum RollError {
    /// The current instance could not be identified.
    #[error("failed to resolve instance identity: {0}")]
    Identity(#[from] IdentityError),

    /// The instance is not a member of any load balancer.
    #[error("instance {instance_id} is assigned to no load balancers")]
    NotAssigned { instance_id: InstanceId },

    /// A wait phase ran out of its poll budget.
    #[error("{phase} did not converge after {attempts} attempts ({elapsed:?})")]
    PollTimeout {
        phase: Phase,
        attempts: u32,
        elapsed: Duration,
    },
}

impl RollError {
    /// Returns true for the "nothing to drain" outcome.
    pub fn is_not_assigned(&self) -> bool {
        matches!(self, Self::NotAssigned { .. })
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Identity(_) => EXIT_IDENTITY,
            Self::NotAssigned { .. } => EXIT_NOT_ASSIGNED,
            Self::PollTimeout { .. } => EXIT_POLL_TIMEOUT,
        }
    }
}

/// Failure of a single remote load balancer call.
#[derive(Debug, Error)]
#[error("{operation} failed: {message}")]
pub struct BackendError {
    /// Name of the remote operation.
    pub operation: &'static str,
    pub message: String,
}

impl BackendError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Failure to discover who we are.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The metadata source could not be reached or answered with garbage.
    #[error("instance metadata unavailable: {0}")]
    Metadata(String),

    /// The inventory lookup for the instance's tags failed.
    #[error("instance lookup failed: {0}")]
    Inventory(String),
}

/// Failure to launch the wrapped command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn `{shell}`: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for command: {0}")]
    Wait(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let not_assigned = RollError::NotAssigned {
            instance_id: InstanceId::from("i-1"),
        };
        let identity = RollError::Identity(IdentityError::Metadata("no imds".into()));
        let timeout = RollError::PollTimeout {
            phase: Phase::AwaitDrained,
            attempts: 3,
            elapsed: Duration::from_secs(15),
        };

        assert!(not_assigned.is_not_assigned());
        assert!(!identity.is_not_assigned());
        assert_eq!(not_assigned.exit_code(), 2);
        assert_eq!(identity.exit_code(), 3);
        assert_eq!(timeout.exit_code(), 4);
    }

    #[test]
    fn test_error_messages() {
        let err = RollError::NotAssigned {
            instance_id: InstanceId::from("i-abc"),
        };
        assert_eq!(
            err.to_string(),
            "instance i-abc is assigned to no load balancers"
        );

        let err = BackendError::new("DescribeInstanceHealth", "throttled");
        assert_eq!(err.to_string(), "DescribeInstanceHealth failed: throttled");
    }
}
