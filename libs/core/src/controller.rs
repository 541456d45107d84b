//! Per load balancer membership and health operations.
//!
//! Every remote failure is logged and converted into the conservative
//! answer (`false` or [`HealthState::Gone`]). Callers recover by polling,
//! so there is no separate error path at this granularity.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::backend::LoadBalancerBackend;
use crate::types::{HealthState, InstanceId, LoadBalancerName};

/// Membership and health operations for one instance against named load balancers.
#[derive(Clone)]
pub struct LoadBalancerController {
    backend: Arc<dyn LoadBalancerBackend>,
}

impl LoadBalancerController {
    pub fn new(backend: Arc<dyn LoadBalancerBackend>) -> Self {
        Self { backend }
    }

    /// Every load balancer that currently lists the instance.
    ///
    /// A failed enumeration yields an empty list.
    pub async fn find_memberships(&self, instance_id: &InstanceId) -> Vec<LoadBalancerName> {
        let descriptions = match self.backend.describe_load_balancers().await {
            Ok(descriptions) => descriptions,
            Err(e) => {
                warn!(error = %e, "error describing load balancers");
                return Vec::new();
            }
        };

        let mut found: Vec<LoadBalancerName> = Vec::new();
        for description in descriptions {
            if description.instances.contains(instance_id) && !found.contains(&description.name)
            {
                found.push(description.name);
            }
        }

        debug!(count = found.len(), "membership lookup complete");
        found
    }

    /// Ask a load balancer to drop the instance.
    ///
    /// True only when the member list reported after the call no longer
    /// contains the instance.
    #[instrument(skip(self, instance_id, load_balancer), fields(load_balancer = %load_balancer))]
    pub async fn deregister(
        &self,
        instance_id: &InstanceId,
        load_balancer: &LoadBalancerName,
    ) -> bool {
        info!("deregistering instance from load balancer");

        let members = match self
            .backend
            .deregister_instance(load_balancer, instance_id)
            .await
        {
            Ok(members) => members,
            Err(e) => {
                warn!(error = %e, "error deregistering instance");
                return false;
            }
        };

        info!(instances = ?members, "load balancer instances");

        !members.contains(instance_id)
    }

    /// Ask a load balancer to take the instance back.
    ///
    /// True only when the member list reported after the call contains the
    /// instance.
    #[instrument(skip(self, instance_id, load_balancer), fields(load_balancer = %load_balancer))]
    pub async fn register(
        &self,
        instance_id: &InstanceId,
        load_balancer: &LoadBalancerName,
    ) -> bool {
        info!("registering instance with load balancer");

        let members = match self
            .backend
            .register_instance(load_balancer, instance_id)
            .await
        {
            Ok(members) => members,
            Err(e) => {
                warn!(error = %e, "error registering instance");
                return false;
            }
        };

        info!(instances = ?members, "load balancer instances");

        members.contains(instance_id)
    }

    /// Fresh health read. Failures and omissions are reported as `Gone`.
    #[instrument(skip(self, instance_id, load_balancer), fields(load_balancer = %load_balancer))]
    pub async fn health_state(
        &self,
        instance_id: &InstanceId,
        load_balancer: &LoadBalancerName,
    ) -> HealthState {
        debug!("checking instance state");

        let states = match self
            .backend
            .describe_instance_health(load_balancer, instance_id)
            .await
        {
            Ok(states) => states,
            Err(e) => {
                warn!(error = %e, "error checking instance state");
                return HealthState::Gone;
            }
        };

        let state = states
            .into_iter()
            .find(|s| &s.instance_id == instance_id)
            .map(|s| s.state)
            .unwrap_or(HealthState::Gone);

        info!(state = %state, "instance state");
        state
    }

    /// True when the load balancer reports the instance `InService`.
    pub async fn is_healthy(
        &self,
        instance_id: &InstanceId,
        load_balancer: &LoadBalancerName,
    ) -> bool {
        self.health_state(instance_id, load_balancer)
            .await
            .is_in_service()
    }

    /// True when the load balancer reports the instance `OutOfService` or `Gone`.
    pub async fn is_out_of_service(
        &self,
        instance_id: &InstanceId,
        load_balancer: &LoadBalancerName,
    ) -> bool {
        self.health_state(instance_id, load_balancer)
            .await
            .is_out_of_service()
    }
}

impl std::fmt::Debug for LoadBalancerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadBalancerController").finish_non_exhaustive()
    }
}
