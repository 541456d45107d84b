//! EC2 inventory lookups.

use aws_config::SdkConfig;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::{Filter, Reservation};
use roll_core::{IdentityError, InstanceId, Lane};
use tracing::debug;

/// Instance tag holding the lane.
pub const LANE_TAG: &str = "Lane";

/// Reads instance attributes from the EC2 API.
#[derive(Debug, Clone)]
pub struct Ec2Inventory {
    client: aws_sdk_ec2::Client,
}

impl Ec2Inventory {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ec2::Client::new(config),
        }
    }

    /// The lane tag of `instance_id`, or `not-set` when it has none.
    pub async fn instance_lane(&self, instance_id: &InstanceId) -> Result<Lane, IdentityError> {
        let output = self
            .client
            .describe_instances()
            .filters(
                Filter::builder()
                    .name("instance-id")
                    .values(instance_id.as_str())
                    .build(),
            )
            .send()
            .await
            .map_err(|e| IdentityError::Inventory(DisplayErrorContext(&e).to_string()))?;

        let lane = lane_from_reservations(output.reservations(), instance_id);
        debug!(instance_id = %instance_id, lane = %lane, "resolved instance lane");
        Ok(lane)
    }
}

/// Find the lane tag of `instance_id` among `reservations`.
fn lane_from_reservations(reservations: &[Reservation], instance_id: &InstanceId) -> Lane {
    let value = reservations
        .iter()
        .flat_map(|r| r.instances())
        .filter(|i| i.instance_id() == Some(instance_id.as_str()))
        .flat_map(|i| i.tags())
        .find(|t| t.key() == Some(LANE_TAG))
        .and_then(|t| t.value());

    Lane::from_tag(value)
}

#[cfg(test)]
mod tests {
    use aws_sdk_ec2::types::{Instance, Tag};

    use super::*;

    fn instance(id: &str, tags: &[(&str, &str)]) -> Instance {
        let mut builder = Instance::builder().instance_id(id);
        for (key, value) in tags {
            builder = builder.tags(Tag::builder().key(*key).value(*value).build());
        }
        builder.build()
    }

    #[test]
    fn test_lane_tag_found() {
        let reservations = vec![Reservation::builder()
            .instances(instance("i-1", &[("Name", "web-1"), ("Lane", "canary")]))
            .build()];

        let lane = lane_from_reservations(&reservations, &InstanceId::from("i-1"));
        assert_eq!(lane.as_str(), "canary");
    }

    #[test]
    fn test_lane_tag_missing() {
        let reservations = vec![Reservation::builder()
            .instances(instance("i-1", &[("Name", "web-1")]))
            .build()];

        let lane = lane_from_reservations(&reservations, &InstanceId::from("i-1"));
        assert_eq!(lane.as_str(), "not-set");
    }

    #[test]
    fn test_lane_ignores_other_instances() {
        let reservations = vec![Reservation::builder()
            .instances(instance("i-2", &[("Lane", "blue")]))
            .instances(instance("i-1", &[]))
            .build()];

        let lane = lane_from_reservations(&reservations, &InstanceId::from("i-1"));
        assert_eq!(lane, Lane::not_set());
    }

    #[test]
    fn test_no_reservations() {
        let lane = lane_from_reservations(&[], &InstanceId::from("i-1"));
        assert_eq!(lane, Lane::not_set());
    }
}
