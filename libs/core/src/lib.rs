//! Take an instance out of every load balancer, run a command, put it back.
//!
//! The crate is provider agnostic. Remote calls go through
//! [`LoadBalancerBackend`] and [`IdentityResolver`]; the wrapped command goes
//! through [`CommandExecutor`].
//!
//! ## Modules
//!
//! - `controller`: per load balancer register, deregister and health reads
//! - `predicate`: conjunctive checks across every load balancer
//! - `poll`: fixed-interval polling with an optional budget
//! - `orchestrator`: the drain, execute, restore state machine

pub mod backend;
pub mod controller;
pub mod error;
pub mod executor;
pub mod identity;
pub mod orchestrator;
pub mod poll;
pub mod predicate;
pub mod types;

// Re-export commonly used types
pub use backend::LoadBalancerBackend;
pub use controller::LoadBalancerController;
pub use error::{BackendError, CommandError, IdentityError, RollError};
pub use executor::{CommandExecutor, CommandOutcome, ShellExecutor};
pub use identity::{IdentityResolver, StaticIdentity};
pub use orchestrator::{Orchestrator, Phase, RollSettings, RunReport};
pub use poll::PollPolicy;
pub use predicate::{all_satisfy, FanOut};
pub use types::{
    HealthState, Instance, InstanceHealth, InstanceId, Lane, LoadBalancerDescription,
    LoadBalancerName, LoadBalancerSet,
};
