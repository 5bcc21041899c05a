use anyhow::{bail, Result};
use reward_core::{MeshOrchestrator, PeerChange, PeerReport};
use reward_provider::ContainerId;

/// Connect or disconnect the shared services to/from an environment network
pub async fn network_peer(mesh: &MeshOrchestrator, action: &str, network: &str) -> Result<PeerReport> {
    let report = mesh.set_peered_services(action, network).await?;

    for outcome in &report.outcomes {
        let target = outcome
            .container
            .as_ref()
            .map(|id| id.short().to_string())
            .unwrap_or_else(|| outcome.service.clone());

        match &outcome.result {
            Ok(PeerChange::Applied) => println!("{:<12} {}  {}ed", outcome.service, target, report.action),
            Ok(PeerChange::Unchanged) => println!("{:<12} {}  unchanged", outcome.service, target),
            Err(e) => tracing::debug!("{} {} failed: {}", outcome.service, target, e),
        }
    }

    if report.outcomes.is_empty() {
        println!("No shared service containers are running");
    }

    Ok(report)
}

/// Print whether `network` exists
pub async fn network_exists(mesh: &MeshOrchestrator, network: &str) -> Result<bool> {
    let exists = mesh.network_exists(network).await?;
    if exists {
        println!("Network '{}' exists", network);
    } else {
        println!("Network '{}' does not exist", network);
    }
    Ok(exists)
}

/// Print the ID of the single running container matching `name`
pub async fn container_find(mesh: &MeshOrchestrator, name: &str) -> Result<ContainerId> {
    if name.is_empty() {
        bail!("Container name must not be empty");
    }
    let id = mesh.find_container_by_name(name).await?;
    println!("{}", id);
    Ok(id)
}
