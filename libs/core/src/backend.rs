//! Remote load balancer API interface.
//!
//! One method per remote call. Implementations report failures honestly;
//! deciding what a failure means is left to [`crate::LoadBalancerController`].

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::{InstanceHealth, InstanceId, LoadBalancerDescription, LoadBalancerName};

/// Load balancing API.
#[async_trait]
pub trait LoadBalancerBackend: Send + Sync {
    /// List every load balancer visible to the caller along with its members.
    async fn describe_load_balancers(&self) -> Result<Vec<LoadBalancerDescription>, BackendError>;

    /// Remove an instance from a load balancer.
    ///
    /// Returns the member list the load balancer reports after the call.
    async fn deregister_instance(
        &self,
        load_balancer: &LoadBalancerName,
        instance_id: &InstanceId,
    ) -> Result<Vec<InstanceId>, BackendError>;

    /// Add an instance to a load balancer.
    ///
    /// Returns the member list the load balancer reports after the call.
    async fn register_instance(
        &self,
        load_balancer: &LoadBalancerName,
        instance_id: &InstanceId,
    ) -> Result<Vec<InstanceId>, BackendError>;

    /// Query the health of an instance within a load balancer.
    async fn describe_instance_health(
        &self,
        load_balancer: &LoadBalancerName,
        instance_id: &InstanceId,
    ) -> Result<Vec<InstanceHealth>, BackendError>;
}
