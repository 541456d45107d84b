//! Test doubles for the roll orchestration.
//!
//! All fakes write to a shared [`Journal`] so tests can assert on the exact
//! order of remote calls and command executions.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use roll_core::{
    BackendError, CommandError, CommandExecutor, CommandOutcome, HealthState, IdentityError,
    IdentityResolver, Instance, InstanceHealth, InstanceId, Lane, LoadBalancerBackend,
    LoadBalancerDescription, LoadBalancerName,
};

/// Something a fake observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    DescribeLoadBalancers,
    Deregister(String),
    Register(String),
    Health(String),
    Execute(String),
}

/// Shared, ordered record of calls.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    pub fn deregister_calls(&self) -> usize {
        self.count(|e| matches!(e, Event::Deregister(_)))
    }

    pub fn register_calls(&self) -> usize {
        self.count(|e| matches!(e, Event::Register(_)))
    }

    pub fn health_calls(&self, load_balancer: &str) -> usize {
        self.count(|e| matches!(e, Event::Health(lb) if lb == load_balancer))
    }

    pub fn executions(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::Execute(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    /// Position of the first event matching `pred`.
    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.0.lock().unwrap().iter().position(pred)
    }
}

/// Remote operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Op {
    Deregister,
    Register,
    Health,
}

#[derive(Debug, Default)]
struct State {
    members: BTreeMap<LoadBalancerName, Vec<InstanceId>>,
    failing: BTreeSet<(Op, LoadBalancerName)>,
    sticky: BTreeSet<LoadBalancerName>,
    remembering: BTreeSet<LoadBalancerName>,
    warming: BTreeMap<LoadBalancerName, u32>,
    fail_describe: bool,
}

/// In-memory load balancing API.
///
/// Registered instances report `InService` (after an optional warm-up of
/// `Unknown` reads). Unregistered instances are left out of health
/// responses, the way a balancer that has forgotten an instance behaves,
/// unless the balancer was built with [`FakeBackend::remembering`].
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
    journal: Journal,
}

impl FakeBackend {
    pub fn new(journal: Journal) -> Self {
        Self {
            state: Arc::default(),
            journal,
        }
    }

    /// Add a load balancer listing `instances`.
    pub fn with_load_balancer(self, name: &str, instances: &[&str]) -> Self {
        self.state.lock().unwrap().members.insert(
            LoadBalancerName::from(name),
            instances.iter().map(|i| InstanceId::from(*i)).collect(),
        );
        self
    }

    /// Make every `op` call against `load_balancer` fail.
    pub fn failing(self, op: Op, load_balancer: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert((op, LoadBalancerName::from(load_balancer)));
        self
    }

    /// Make enumeration of load balancers fail.
    pub fn failing_describe(self) -> Self {
        self.state.lock().unwrap().fail_describe = true;
        self
    }

    /// Accept deregistration calls without removing the instance.
    pub fn sticky(self, load_balancer: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .sticky
            .insert(LoadBalancerName::from(load_balancer));
        self
    }

    /// Keep listing unregistered instances in health responses as `OutOfService`.
    pub fn remembering(self, load_balancer: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .remembering
            .insert(LoadBalancerName::from(load_balancer));
        self
    }

    /// Report `Unknown` for the next `reads` health queries of a registered instance.
    pub fn warming_up(self, load_balancer: &str, reads: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .warming
            .insert(LoadBalancerName::from(load_balancer), reads);
        self
    }

    /// Stop failing `op` against `load_balancer`.
    pub fn heal(&self, op: Op, load_balancer: &str) {
        self.state
            .lock()
            .unwrap()
            .failing
            .remove(&(op, LoadBalancerName::from(load_balancer)));
    }

    /// Current members of a load balancer.
    pub fn members(&self, load_balancer: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .members
            .get(&LoadBalancerName::from(load_balancer))
            .map(|m| m.iter().map(|i| i.to_string()).collect())
            .unwrap_or_default()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    fn check(
        &self,
        state: &State,
        op: Op,
        load_balancer: &LoadBalancerName,
    ) -> Result<(), BackendError> {
        if state.failing.contains(&(op, load_balancer.clone())) {
            return Err(BackendError::new(
                op_name(op),
                format!("injected failure for {load_balancer}"),
            ));
        }
        if !state.members.contains_key(load_balancer) {
            return Err(BackendError::new(
                op_name(op),
                format!("load balancer {load_balancer} not found"),
            ));
        }
        Ok(())
    }
}

fn op_name(op: Op) -> &'static str {
    match op {
        Op::Deregister => "DeregisterInstancesFromLoadBalancer",
        Op::Register => "RegisterInstancesWithLoadBalancer",
        Op::Health => "DescribeInstanceHealth",
    }
}

#[async_trait]
impl LoadBalancerBackend for FakeBackend {
    async fn describe_load_balancers(&self) -> Result<Vec<LoadBalancerDescription>, BackendError> {
        self.journal.push(Event::DescribeLoadBalancers);
        let state = self.state.lock().unwrap();

        if state.fail_describe {
            return Err(BackendError::new("DescribeLoadBalancers", "injected failure"));
        }

        Ok(state
            .members
            .iter()
            .map(|(name, instances)| LoadBalancerDescription {
                name: name.clone(),
                instances: instances.clone(),
            })
            .collect())
    }

    async fn deregister_instance(
        &self,
        load_balancer: &LoadBalancerName,
        instance_id: &InstanceId,
    ) -> Result<Vec<InstanceId>, BackendError> {
        self.journal.push(Event::Deregister(load_balancer.to_string()));
        let mut state = self.state.lock().unwrap();
        self.check(&state, Op::Deregister, load_balancer)?;

        let sticky = state.sticky.contains(load_balancer);
        let members = state
            .members
            .get_mut(load_balancer)
            .expect("checked above");
        if !sticky {
            members.retain(|i| i != instance_id);
        }
        Ok(members.clone())
    }

    async fn register_instance(
        &self,
        load_balancer: &LoadBalancerName,
        instance_id: &InstanceId,
    ) -> Result<Vec<InstanceId>, BackendError> {
        self.journal.push(Event::Register(load_balancer.to_string()));
        let mut state = self.state.lock().unwrap();
        self.check(&state, Op::Register, load_balancer)?;

        let members = state
            .members
            .get_mut(load_balancer)
            .expect("checked above");
        if !members.contains(instance_id) {
            members.push(instance_id.clone());
        }
        Ok(members.clone())
    }

    async fn describe_instance_health(
        &self,
        load_balancer: &LoadBalancerName,
        instance_id: &InstanceId,
    ) -> Result<Vec<InstanceHealth>, BackendError> {
        self.journal.push(Event::Health(load_balancer.to_string()));
        let mut state = self.state.lock().unwrap();
        self.check(&state, Op::Health, load_balancer)?;

        let registered = state
            .members
            .get(load_balancer)
            .is_some_and(|m| m.contains(instance_id));
        if !registered {
            if !state.remembering.contains(load_balancer) {
                return Ok(Vec::new());
            }
            return Ok(vec![InstanceHealth {
                instance_id: instance_id.clone(),
                state: HealthState::OutOfService,
            }]);
        }

        let health = match state.warming.get_mut(load_balancer) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                HealthState::Unknown
            }
            _ => HealthState::InService,
        };

        Ok(vec![InstanceHealth {
            instance_id: instance_id.clone(),
            state: health,
        }])
    }
}

/// Resolver that always fails.
#[derive(Debug, Clone, Default)]
pub struct UnreachableIdentity;

#[async_trait]
impl IdentityResolver for UnreachableIdentity {
    async fn resolve(&self) -> Result<Instance, IdentityError> {
        Err(IdentityError::Metadata(
            "connection refused: 169.254.169.254:80".to_string(),
        ))
    }
}

/// An instance suitable for tests.
pub fn test_instance(id: &str) -> Instance {
    Instance::new(InstanceId::from(id), "us-east-1", Lane::new("blue"))
}

/// Executor that records commands instead of running them.
#[derive(Debug, Clone)]
pub struct RecordingExecutor {
    outcome: Result<CommandOutcome, String>,
    journal: Journal,
}

impl RecordingExecutor {
    /// Every command exits with `code`.
    pub fn exiting(journal: Journal, code: i32) -> Self {
        Self {
            outcome: Ok(CommandOutcome::from_code(Some(code))),
            journal,
        }
    }

    /// Every command fails to launch.
    pub fn unlaunchable(journal: Journal) -> Self {
        Self {
            outcome: Err("no such file or directory".to_string()),
            journal,
        }
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, command: &str) -> Result<CommandOutcome, CommandError> {
        self.journal.push(Event::Execute(command.to_string()));
        match &self.outcome {
            Ok(outcome) => Ok(outcome.clone()),
            Err(message) => Err(CommandError::Spawn {
                shell: "bash".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, message.clone()),
            }),
        }
    }
}
