//! AWS credential and region configuration.
//!
//! Credentials are tried in this order:
//! 1. `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` environment variables
//! 2. the shared credentials file, using the configured profile
//! 3. the instance profile, via the instance metadata service

use std::path::{Path, PathBuf};

use aws_config::environment::credentials::EnvironmentVariableCredentialsProvider;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_config::meta::credentials::CredentialsProviderChain;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use directories::BaseDirs;
use tracing::debug;

use crate::error::AwsError;

/// Default shared credentials file.
pub const DEFAULT_CREDENTIALS_FILE: &str = "~/.aws/credentials";

/// Default credentials profile.
pub const DEFAULT_PROFILE: &str = "default";

/// Where to find credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    /// Shared credentials file; a leading `~` is expanded.
    pub credentials_file: String,

    /// Profile within the shared credentials file.
    pub profile: String,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            credentials_file: DEFAULT_CREDENTIALS_FILE.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
        }
    }
}

impl AwsSettings {
    /// Credentials file path with `~` expanded.
    pub fn credentials_path(&self) -> Result<PathBuf, AwsError> {
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        expand_home(&self.credentials_file, home.as_deref())
    }

    /// Load SDK configuration for `region`.
    pub async fn load(&self, region: &str) -> Result<SdkConfig, AwsError> {
        let path = self.credentials_path()?;
        debug!(
            credentials_file = %path.display(),
            profile = %self.profile,
            region,
            "loading aws configuration"
        );

        let files = ProfileFiles::builder()
            .with_file(ProfileFileKind::Credentials, path)
            .build();
        let profile = ProfileFileCredentialsProvider::builder()
            .profile_files(files)
            .profile_name(&self.profile)
            .build();

        let chain = CredentialsProviderChain::first_try(
            "Environment",
            EnvironmentVariableCredentialsProvider::new(),
        )
        .or_else("SharedCredentialsFile", profile)
        .or_else("InstanceProfile", ImdsCredentialsProvider::builder().build());

        Ok(aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(chain)
            .load()
            .await)
    }
}

/// Expand a leading `~` against `home`.
fn expand_home(path: &str, home: Option<&Path>) -> Result<PathBuf, AwsError> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(path)),
    };

    let home = home.ok_or_else(|| AwsError::NoHomeDirectory {
        path: path.to_string(),
    })?;

    if rest.is_empty() {
        Ok(home.to_path_buf())
    } else {
        Ok(home.join(rest))
    }
}
