//! Instance identity resolution interface.

use async_trait::async_trait;

use crate::error::IdentityError;
use crate::types::Instance;

/// Discovers the instance this process runs on.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve id, region and lane of the current instance.
    async fn resolve(&self) -> Result<Instance, IdentityError>;
}

/// Resolver returning a fixed instance.
///
/// Useful when the identity is already known, e.g. passed in by a wrapper.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub Instance);

#[async_trait]
impl IdentityResolver for StaticIdentity {
    async fn resolve(&self) -> Result<Instance, IdentityError> {
        Ok(self.0.clone())
    }
}
