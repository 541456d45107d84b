//! The drain, execute, restore state machine.
//!
//! ```text
//! Resolve -> Drain -> AwaitDrained -> Execute -> Restore -> AwaitHealthy -> Done
//! ```
//!
//! Transitions only move forward. A partial failure during Drain or Restore
//! is never rolled back; the following wait phase simply does not converge
//! until every load balancer agrees.

use std::fmt;
use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use crate::controller::LoadBalancerController;
use crate::error::RollError;
use crate::executor::{CommandExecutor, CommandOutcome};
use crate::identity::IdentityResolver;
use crate::poll::{poll_until, PollPolicy};
use crate::predicate::{all_satisfy, FanOut};
use crate::types::{Instance, LoadBalancerSet};

/// States of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Resolve,
    Drain,
    AwaitDrained,
    Execute,
    Restore,
    AwaitHealthy,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Resolve => "resolve",
            Phase::Drain => "drain",
            Phase::AwaitDrained => "await_drained",
            Phase::Execute => "execute",
            Phase::Restore => "restore",
            Phase::AwaitHealthy => "await_healthy",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for a run.
#[derive(Debug, Clone, Default)]
pub struct RollSettings {
    /// How calls within one fan-out are issued.
    pub fan_out: FanOut,

    /// Polling for AwaitDrained.
    pub drain_poll: PollPolicy,

    /// Polling for AwaitHealthy.
    pub healthy_poll: PollPolicy,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub instance: Instance,
    pub load_balancers: LoadBalancerSet,

    /// Whether every deregister call reported success on the first pass.
    pub deregistered: bool,

    /// Whether every register call reported success on the first pass.
    pub registered: bool,

    pub command: CommandOutcome,

    /// Poll attempts spent in AwaitDrained.
    pub drain_attempts: u32,

    /// Poll attempts spent in AwaitHealthy.
    pub healthy_attempts: u32,

    /// Phases visited, in order.
    pub phases: Vec<Phase>,
}

/// Drives one instance through drain, execute and restore.
pub struct Orchestrator {
    resolver: Arc<dyn IdentityResolver>,
    controller: LoadBalancerController,
    executor: Arc<dyn CommandExecutor>,
    settings: RollSettings,
}

impl Orchestrator {
    pub fn new(
        resolver: Arc<dyn IdentityResolver>,
        controller: LoadBalancerController,
        executor: Arc<dyn CommandExecutor>,
        settings: RollSettings,
    ) -> Self {
        Self {
            resolver,
            controller,
            executor,
            settings,
        }
    }

    /// Run `command` with the current instance out of rotation.
    ///
    /// Fails before touching any load balancer when the instance cannot be
    /// identified or belongs to none. After that, only an exhausted poll
    /// budget ends the run early; the command's own failure does not.
    pub async fn run(&self, command: &str) -> Result<RunReport, RollError> {
        info!(phase = %Phase::Resolve, "retrieving instance metadata");
        let instance = self.resolver.resolve().await?;

        let span = info_span!(
            "roll",
            instance_id = %instance.id,
            region = %instance.region,
            lane = %instance.lane,
        );

        self.run_for(instance, command).instrument(span).await
    }

    async fn run_for(&self, instance: Instance, command: &str) -> Result<RunReport, RollError> {
        let mut phases = vec![Phase::Resolve];
        info!("found instance");

        let discovered = self.controller.find_memberships(&instance.id).await;
        let Some(load_balancers) = LoadBalancerSet::new(discovered) else {
            warn!("instance is assigned to no load balancers; aborting");
            return Err(RollError::NotAssigned {
                instance_id: instance.id,
            });
        };
        info!(load_balancers = %load_balancers, "found instance load balancers");

        let fan_out = self.settings.fan_out;

        enter(&mut phases, Phase::Drain);
        let deregistered = all_satisfy(&load_balancers, fan_out, |lb| {
            self.controller.deregister(&instance.id, lb)
        })
        .instrument(info_span!("phase", phase = %Phase::Drain))
        .await;
        if !deregistered {
            warn!("not every load balancer confirmed deregistration; waiting on health");
        }

        enter(&mut phases, Phase::AwaitDrained);
        info!("waiting for instance to be out of service");
        let drain_attempts = poll_until(&self.settings.drain_poll, Phase::AwaitDrained, || {
            all_satisfy(&load_balancers, fan_out, |lb| {
                self.controller.is_out_of_service(&instance.id, lb)
            })
        })
        .instrument(info_span!("phase", phase = %Phase::AwaitDrained))
        .await?;

        enter(&mut phases, Phase::Execute);
        let outcome = self
            .execute(command)
            .instrument(info_span!("phase", phase = %Phase::Execute))
            .await;

        enter(&mut phases, Phase::Restore);
        let registered = all_satisfy(&load_balancers, fan_out, |lb| {
            self.controller.register(&instance.id, lb)
        })
        .instrument(info_span!("phase", phase = %Phase::Restore))
        .await;
        if !registered {
            warn!("not every load balancer confirmed registration; waiting on health");
        }

        enter(&mut phases, Phase::AwaitHealthy);
        info!("waiting for instance to be healthy");
        let healthy_attempts = poll_until(&self.settings.healthy_poll, Phase::AwaitHealthy, || {
            all_satisfy(&load_balancers, fan_out, |lb| {
                self.controller.is_healthy(&instance.id, lb)
            })
        })
        .instrument(info_span!("phase", phase = %Phase::AwaitHealthy))
        .await?;

        enter(&mut phases, Phase::Done);
        info!("done");

        Ok(RunReport {
            instance,
            load_balancers,
            deregistered,
            registered,
            command: outcome,
            drain_attempts,
            healthy_attempts,
            phases,
        })
    }

    async fn execute(&self, command: &str) -> CommandOutcome {
        info!(command = %command, "running command");

        let outcome = match self.executor.execute(command).await {
            Ok(outcome) => outcome,
            Err(e) => CommandOutcome::LaunchFailed(e.to_string()),
        };

        match &outcome {
            CommandOutcome::Succeeded => info!("command finished"),
            CommandOutcome::Failed { code } => {
                warn!(exit_code = ?code, "command failed; restoring anyway")
            }
            CommandOutcome::LaunchFailed(error) => {
                warn!(error = %error, "failed to run command; restoring anyway")
            }
        }

        outcome
    }
}

fn enter(phases: &mut Vec<Phase>, phase: Phase) {
    debug_assert!(phases.last().is_none_or(|last| *last < phase));
    phases.push(phase);
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_ordered() {
        let phases = [
            Phase::Resolve,
            Phase::Drain,
            Phase::AwaitDrained,
            Phase::Execute,
            Phase::Restore,
            Phase::AwaitHealthy,
            Phase::Done,
        ];
        assert!(phases.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::AwaitDrained.to_string(), "await_drained");
        assert_eq!(Phase::Done.to_string(), "done");
    }

    #[test]
    fn test_enter_records_phases() {
        let mut phases = vec![Phase::Resolve];
        enter(&mut phases, Phase::Drain);
        enter(&mut phases, Phase::AwaitDrained);
        assert_eq!(
            phases,
            vec![Phase::Resolve, Phase::Drain, Phase::AwaitDrained]
        );
    }
}
