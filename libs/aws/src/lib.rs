//! AWS bindings for aws-roll.
//!
//! - `metadata`: instance identity document from IMDS
//! - `ec2`: lane tag lookup
//! - `elb`: classic ELB [`roll_core::LoadBalancerBackend`]
//! - `config`: credential chain and region setup

pub mod config;
pub mod ec2;
pub mod elb;
pub mod error;
pub mod identity;
pub mod metadata;

pub use config::AwsSettings;
pub use ec2::Ec2Inventory;
pub use elb::ElbBackend;
pub use error::AwsError;
pub use identity::Ec2IdentityResolver;
pub use metadata::{IdentityDocument, InstanceMetadata};
