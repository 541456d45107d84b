//! Identity resolution for EC2 instances.

use async_trait::async_trait;
use roll_core::{IdentityError, IdentityResolver, Instance, InstanceId};

use crate::ec2::Ec2Inventory;
use crate::metadata::IdentityDocument;

/// Combines the identity document with the instance's lane tag.
#[derive(Debug, Clone)]
pub struct Ec2IdentityResolver {
    document: IdentityDocument,
    inventory: Ec2Inventory,
}

impl Ec2IdentityResolver {
    pub fn new(document: IdentityDocument, inventory: Ec2Inventory) -> Self {
        Self {
            document,
            inventory,
        }
    }
}

#[async_trait]
impl IdentityResolver for Ec2IdentityResolver {
    async fn resolve(&self) -> Result<Instance, IdentityError> {
        let id = InstanceId::new(self.document.instance_id.clone());
        let lane = self.inventory.instance_lane(&id).await?;
        Ok(Instance::new(id, self.document.region.clone(), lane))
    }
}
