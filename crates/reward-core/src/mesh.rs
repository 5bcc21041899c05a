//! Attaching the shared service containers to environment networks
//!
//! Every environment gets its own Docker network. The shared ("peered")
//! services, the reverse proxy first, are connected to that network when the
//! environment starts and disconnected when it stops.

use crate::{CoreError, Result};
use reward_config::PeeringConfig;
use reward_provider::{ContainerEngine, ContainerId, ContainerSummary, NetworkEndpoint, ProviderError};
use std::fmt;
use std::str::FromStr;

/// Service that is always peered
pub const REVERSE_PROXY_SERVICE: &str = "traefik";

/// Peered unless explicitly disabled
pub const DEFAULT_ENABLED_SERVICES: &[&str] = &["tunnel", "mailhog", "phpmyadmin", "elastichq"];

/// Peered only when explicitly enabled
pub const DEFAULT_DISABLED_SERVICES: &[&str] = &["adminer"];

/// Services to act on, in processing order
pub fn resolve_peered_services(config: &PeeringConfig) -> Vec<&'static str> {
    let mut services = vec![REVERSE_PROXY_SERVICE];
    services.extend(
        DEFAULT_ENABLED_SERVICES
            .iter()
            .copied()
            .filter(|svc| config.service_enabled_permissive(svc)),
    );
    services.extend(
        DEFAULT_DISABLED_SERVICES
            .iter()
            .copied()
            .filter(|svc| config.service_enabled_strict(svc)),
    );
    services
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerAction {
    Connect,
    Disconnect,
}

impl FromStr for PeerAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "connect" => Ok(Self::Connect),
            "disconnect" => Ok(Self::Disconnect),
            other => Err(CoreError::UnsupportedAction(other.to_string())),
        }
    }
}

impl fmt::Display for PeerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Disconnect => write!(f, "disconnect"),
        }
    }
}

/// What happened to one container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerChange {
    /// The engine was asked to attach/detach
    Applied,
    /// Already in the requested state, no engine call made
    Unchanged,
}

/// Outcome for one container, or for a whole service whose listing failed
#[derive(Debug)]
pub struct PeerOutcome {
    pub service: String,
    /// `None` when the container listing for the service failed
    pub container: Option<ContainerId>,
    pub result: std::result::Result<PeerChange, ProviderError>,
}

impl PeerOutcome {
    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

/// Per-container outcomes of one [`MeshOrchestrator::set_peered_services`] call
#[derive(Debug)]
pub struct PeerReport {
    pub action: PeerAction,
    pub network: String,
    pub outcomes: Vec<PeerOutcome>,
}

impl PeerReport {
    fn new(action: PeerAction, network: &str) -> Self {
        Self {
            action,
            network: network.to_string(),
            outcomes: Vec::new(),
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &PeerOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Number of containers the engine actually attached or detached
    pub fn applied(&self) -> usize {
        self.count(PeerChange::Applied)
    }

    pub fn unchanged(&self) -> usize {
        self.count(PeerChange::Unchanged)
    }

    fn count(&self, change: PeerChange) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(c) if c == change))
            .count()
    }
}

/// Orchestrates the shared service containers on environment networks
pub struct MeshOrchestrator {
    engine: Box<dyn ContainerEngine>,
    config: PeeringConfig,
}

impl MeshOrchestrator {
    pub fn new(engine: Box<dyn ContainerEngine>, config: PeeringConfig) -> Self {
        Self { engine, config }
    }

    /// Connect or disconnect every enabled shared service to/from `network`
    ///
    /// Only an unknown action fails the call. Engine failures for individual
    /// services or containers are logged and recorded in the report, and the
    /// remaining services are still processed.
    pub async fn set_peered_services(&self, action: &str, network: &str) -> Result<PeerReport> {
        let action: PeerAction = action.parse()?;
        let mut report = PeerReport::new(action, network);

        for service in resolve_peered_services(&self.config) {
            let aliases = self.aliases_for(service, action);

            let containers = match self.engine.list_containers(service).await {
                Ok(containers) => containers,
                Err(e) => {
                    tracing::debug!("Failed to list {} containers: {}", service, e);
                    report.outcomes.push(PeerOutcome {
                        service: service.to_string(),
                        container: None,
                        result: Err(e),
                    });
                    continue;
                }
            };

            for container in containers {
                let result = self.apply(action, network, &container, &aliases).await;
                if let Err(e) = &result {
                    tracing::debug!(
                        "Failed to {} {} on network {}: {}",
                        action,
                        container.display_name(),
                        network,
                        e
                    );
                }
                report.outcomes.push(PeerOutcome {
                    service: service.to_string(),
                    container: Some(container.id),
                    result,
                });
            }
        }

        tracing::info!(
            "Peered services {}: {} changed, {} unchanged on network {}",
            action,
            report.applied(),
            report.unchanged(),
            network
        );
        if !report.is_clean() {
            tracing::debug!(
                "{} peered service operations failed on network {}",
                report.failures().count(),
                network
            );
        }

        Ok(report)
    }

    async fn apply(
        &self,
        action: PeerAction,
        network: &str,
        container: &ContainerSummary,
        aliases: &[String],
    ) -> std::result::Result<PeerChange, ProviderError> {
        let attached = container.is_attached_to(network);

        match action {
            PeerAction::Connect if attached => {
                tracing::debug!("{} is already on network {}", container.display_name(), network);
                Ok(PeerChange::Unchanged)
            }
            PeerAction::Connect => {
                tracing::debug!("Connecting container {} to network {}", container.display_name(), network);
                let endpoint = NetworkEndpoint::new(network, container.id.clone())
                    .with_aliases(aliases.to_vec());
                self.engine.connect_network(&endpoint).await?;
                Ok(PeerChange::Applied)
            }
            PeerAction::Disconnect if !attached => {
                tracing::debug!("{} is not on network {}", container.display_name(), network);
                Ok(PeerChange::Unchanged)
            }
            PeerAction::Disconnect => {
                tracing::debug!(
                    "Disconnecting container {} from network {}",
                    container.display_name(),
                    network
                );
                self.engine.disconnect_network(network, &container.id).await?;
                Ok(PeerChange::Applied)
            }
        }
    }

    /// DNS aliases registered for `service` on connect
    fn aliases_for(&self, service: &str, action: PeerAction) -> Vec<String> {
        if action != PeerAction::Connect
            || service != REVERSE_PROXY_SERVICE
            || !self.config.resolve_domain_to_proxy
        {
            return Vec::new();
        }

        let mut aliases = vec![self.config.domain.clone(), self.config.full_domain()];
        aliases.dedup();
        tracing::debug!("Network aliases for {}: {:?}", service, aliases);
        aliases
    }

    /// Identifier of the single running container whose name contains `name`
    pub async fn find_container_by_name(&self, name: &str) -> Result<ContainerId> {
        let mut containers = self.engine.list_containers(name).await?;

        match containers.len() {
            0 => Err(CoreError::ContainerNotFound(name.to_string())),
            1 => Ok(containers.remove(0).id),
            _ => Err(CoreError::ContainerAmbiguous {
                name: name.to_string(),
                candidates: containers
                    .iter()
                    .map(|c| c.display_name().to_string())
                    .collect(),
            }),
        }
    }

    /// Whether exactly one running container matches `name`
    pub async fn is_container_running(&self, name: &str) -> Result<bool> {
        match self.find_container_by_name(name).await {
            Ok(_) => Ok(true),
            Err(CoreError::ContainerNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn network_exists(&self, name: &str) -> Result<bool> {
        let networks = self
            .engine
            .list_networks(name)
            .await
            .map_err(|source| CoreError::NetworkQuery {
                network: name.to_string(),
                source,
            })?;

        Ok(!networks.is_empty())
    }
}
