//! Wiring between the command line and the orchestrator.

use std::sync::Arc;

use anyhow::{Context, Result};
use roll_aws::{Ec2IdentityResolver, Ec2Inventory, ElbBackend, InstanceMetadata};
use roll_core::{
    CommandExecutor, IdentityError, IdentityResolver, LoadBalancerBackend,
    LoadBalancerController, Orchestrator, RollError, RunReport, ShellExecutor,
};
use tracing::info;

use crate::cli::Cli;

/// Assemble an orchestrator from the given collaborators and the CLI flags.
pub fn build_orchestrator(
    cli: &Cli,
    resolver: Arc<dyn IdentityResolver>,
    backend: Arc<dyn LoadBalancerBackend>,
    executor: Arc<dyn CommandExecutor>,
) -> Orchestrator {
    Orchestrator::new(
        resolver,
        LoadBalancerController::new(backend),
        executor,
        cli.roll_settings(),
    )
}

/// Roll the current EC2 instance around `command`.
pub async fn roll(cli: &Cli, command: &str) -> Result<RunReport> {
    let mut document = InstanceMetadata::new()
        .identity_document()
        .await
        .map_err(|e| RollError::Identity(IdentityError::from(e)))?;

    if let Some(region) = &cli.region {
        document.region = region.clone();
    }

    let sdk_config = cli
        .aws_settings()
        .load(&document.region)
        .await
        .context("failed to load AWS configuration")?;

    info!(
        instance_id = %document.instance_id,
        region = %document.region,
        profile = %cli.profile,
        "configuration loaded"
    );

    let resolver = Ec2IdentityResolver::new(document, Ec2Inventory::new(&sdk_config));
    let orchestrator = build_orchestrator(
        cli,
        Arc::new(resolver),
        Arc::new(ElbBackend::new(&sdk_config)),
        Arc::new(ShellExecutor::new(cli.shell.clone())),
    );

    Ok(orchestrator.run(command).await?)
}
