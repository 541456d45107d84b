//! Classic Elastic Load Balancing backend.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_elasticloadbalancing::error::DisplayErrorContext;
use aws_sdk_elasticloadbalancing::types::{
    Instance as ElbInstance, InstanceState, LoadBalancerDescription as ElbDescription,
};
use roll_core::{
    BackendError, HealthState, InstanceHealth, InstanceId, LoadBalancerBackend,
    LoadBalancerDescription, LoadBalancerName,
};
use tracing::debug;

/// [`LoadBalancerBackend`] over the classic ELB API.
#[derive(Debug, Clone)]
pub struct ElbBackend {
    client: aws_sdk_elasticloadbalancing::Client,
}

impl ElbBackend {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_elasticloadbalancing::Client::new(config),
        }
    }
}

fn remote_error<E>(operation: &'static str, err: E) -> BackendError
where
    E: std::error::Error,
{
    BackendError::new(operation, DisplayErrorContext(&err).to_string())
}

fn target(instance_id: &InstanceId) -> ElbInstance {
    ElbInstance::builder()
        .instance_id(instance_id.as_str())
        .build()
}

#[async_trait]
impl LoadBalancerBackend for ElbBackend {
    async fn describe_load_balancers(&self) -> Result<Vec<LoadBalancerDescription>, BackendError> {
        let mut descriptions = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_load_balancers()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| remote_error("DescribeLoadBalancers", e))?;

            descriptions.extend(descriptions_from(output.load_balancer_descriptions()));

            match output.next_marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        debug!(count = descriptions.len(), "described load balancers");
        Ok(descriptions)
    }

    async fn deregister_instance(
        &self,
        load_balancer: &LoadBalancerName,
        instance_id: &InstanceId,
    ) -> Result<Vec<InstanceId>, BackendError> {
        let output = self
            .client
            .deregister_instances_from_load_balancer()
            .load_balancer_name(load_balancer.as_str())
            .instances(target(instance_id))
            .send()
            .await
            .map_err(|e| remote_error("DeregisterInstancesFromLoadBalancer", e))?;

        Ok(member_ids(output.instances()))
    }

    async fn register_instance(
        &self,
        load_balancer: &LoadBalancerName,
        instance_id: &InstanceId,
    ) -> Result<Vec<InstanceId>, BackendError> {
        let output = self
            .client
            .register_instances_with_load_balancer()
            .load_balancer_name(load_balancer.as_str())
            .instances(target(instance_id))
            .send()
            .await
            .map_err(|e| remote_error("RegisterInstancesWithLoadBalancer", e))?;

        Ok(member_ids(output.instances()))
    }

    async fn describe_instance_health(
        &self,
        load_balancer: &LoadBalancerName,
        instance_id: &InstanceId,
    ) -> Result<Vec<InstanceHealth>, BackendError> {
        let output = self
            .client
            .describe_instance_health()
            .load_balancer_name(load_balancer.as_str())
            .instances(target(instance_id))
            .send()
            .await
            .map_err(|e| remote_error("DescribeInstanceHealth", e))?;

        Ok(health_from(output.instance_states()))
    }
}

fn descriptions_from(descriptions: &[ElbDescription]) -> Vec<LoadBalancerDescription> {
    descriptions
        .iter()
        .filter_map(|d| {
            let name = d.load_balancer_name()?;
            Some(LoadBalancerDescription {
                name: LoadBalancerName::new(name),
                instances: member_ids(d.instances()),
            })
        })
        .collect()
}

fn member_ids(instances: &[ElbInstance]) -> Vec<InstanceId> {
    instances
        .iter()
        .filter_map(|i| i.instance_id())
        .map(InstanceId::new)
        .collect()
}

// Entries without an instance id are dropped; entries without a state are
// reported as `Unknown`.
fn health_from(states: &[InstanceState]) -> Vec<InstanceHealth> {
    states
        .iter()
        .filter_map(|s| {
            let instance_id = s.instance_id()?;
            Some(InstanceHealth {
                instance_id: InstanceId::new(instance_id),
                state: s.state().map(HealthState::parse).unwrap_or(HealthState::Unknown),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elb_instance(id: &str) -> ElbInstance {
        ElbInstance::builder().instance_id(id).build()
    }

    #[test]
    fn test_descriptions_from() {
        let raw = vec![
            ElbDescription::builder()
                .load_balancer_name("web")
                .instances(elb_instance("i-1"))
                .instances(elb_instance("i-2"))
                .build(),
            ElbDescription::builder()
                .instances(elb_instance("i-3"))
                .build(),
        ];

        let descriptions = descriptions_from(&raw);
        assert_eq!(descriptions.len(), 1);
        assert_eq!(descriptions[0].name.as_str(), "web");
        assert_eq!(
            descriptions[0].instances,
            vec![InstanceId::from("i-1"), InstanceId::from("i-2")]
        );
    }

    #[test]
    fn test_member_ids_skips_missing() {
        let raw = vec![elb_instance("i-1"), ElbInstance::builder().build()];
        assert_eq!(member_ids(&raw), vec![InstanceId::from("i-1")]);
    }

    #[test]
    fn test_health_from() {
        let raw = vec![
            InstanceState::builder()
                .instance_id("i-1")
                .state("InService")
                .build(),
            InstanceState::builder()
                .instance_id("i-2")
                .state("OutOfService")
                .build(),
            InstanceState::builder().instance_id("i-3").build(),
            InstanceState::builder().state("InService").build(),
        ];

        let health = health_from(&raw);
        assert_eq!(
            health,
            vec![
                InstanceHealth {
                    instance_id: InstanceId::from("i-1"),
                    state: HealthState::InService,
                },
                InstanceHealth {
                    instance_id: InstanceId::from("i-2"),
                    state: HealthState::OutOfService,
                },
                InstanceHealth {
                    instance_id: InstanceId::from("i-3"),
                    state: HealthState::Unknown,
                },
            ]
        );
    }
}
