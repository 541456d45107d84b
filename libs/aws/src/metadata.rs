//! Instance identity from the EC2 instance metadata service.

use aws_config::imds;
use serde::Deserialize;
use tracing::info;

use crate::error::AwsError;

const IDENTITY_DOCUMENT_PATH: &str = "/latest/dynamic/instance-identity/document";

/// The parts of the instance identity document we care about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDocument {
    pub instance_id: String,
    pub region: String,

    #[serde(default)]
    pub availability_zone: Option<String>,

    #[serde(default)]
    pub account_id: Option<String>,
}

impl IdentityDocument {
    pub fn parse(raw: &str) -> Result<Self, AwsError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Instance metadata service client.
#[derive(Debug, Clone)]
pub struct InstanceMetadata {
    client: imds::Client,
}

impl InstanceMetadata {
    pub fn new() -> Self {
        Self {
            client: imds::Client::builder().build(),
        }
    }

    /// Fetch and parse the identity document of the current instance.
    pub async fn identity_document(&self) -> Result<IdentityDocument, AwsError> {
        info!("retrieving instance metadata");

        let raw = self
            .client
            .get(IDENTITY_DOCUMENT_PATH)
            .await
            .map_err(|e| AwsError::Metadata(e.to_string()))?;

        IdentityDocument::parse(&String::from(raw))
    }
}

impl Default for InstanceMetadata {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identity_document() {
        let raw = r#"{
            "accountId": "123456789012",
            "architecture": "x86_64",
            "availabilityZone": "us-west-2b",
            "imageId": "ami-5fb8c835",
            "instanceId": "i-08a7f1e5f4e0b2c3d",
            "instanceType": "t3.micro",
            "privateIp": "10.158.112.84",
            "region": "us-west-2",
            "version": "2017-09-30"
        }"#;

        let doc = IdentityDocument::parse(raw).unwrap();
        assert_eq!(doc.instance_id, "i-08a7f1e5f4e0b2c3d");
        assert_eq!(doc.region, "us-west-2");
        assert_eq!(doc.availability_zone.as_deref(), Some("us-west-2b"));
        assert_eq!(doc.account_id.as_deref(), Some("123456789012"));
    }

    #[test]
    fn test_parse_rejects_missing_instance_id() {
        let err = IdentityDocument::parse(r#"{"region": "us-west-2"}"#).unwrap_err();
        assert!(matches!(err, AwsError::InvalidDocument(_)));
    }
}
