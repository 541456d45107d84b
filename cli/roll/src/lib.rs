//! aws-roll: run a command with the current EC2 instance out of rotation.
//!
//! The instance is deregistered from every classic load balancer it belongs
//! to, the command runs once it has drained, and the instance is registered
//! again and waited on until healthy.

pub mod app;
pub mod cli;
pub mod error;
pub mod logging;
pub mod version;

pub use cli::{Cli, Invocation, LogFormat};
