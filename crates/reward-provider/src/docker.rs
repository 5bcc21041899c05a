//! Docker engine client using bollard

use crate::{
    ContainerEngine, ContainerId, ContainerSummary, NetworkEndpoint, NetworkSummary,
    ProviderError, Result,
};
use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::models::{ContainerSummary as DockerContainerSummary, EndpointSettings, Network};
use bollard::network::{ConnectNetworkOptions, DisconnectNetworkOptions, ListNetworksOptions};
use bollard::Docker;
use std::collections::HashMap;

/// Docker engine client using the bollard crate
pub struct DockerEngine {
    client: Docker,
}

impl DockerEngine {
    /// Connect to the Docker engine and verify it responds
    pub async fn new(socket_path: &str) -> Result<Self> {
        let client = if socket_path.starts_with("http://") || socket_path.starts_with("https://") {
            Docker::connect_with_http(socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| ProviderError::ConnectionError(e.to_string()))?
        } else {
            let path = socket_path.trim_start_matches("unix://");
            Docker::connect_with_socket(path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| ProviderError::ConnectionError(e.to_string()))?
        };

        client
            .ping()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn list_containers(&self, name_filter: &str) -> Result<Vec<ContainerSummary>> {
        let options = ListContainersOptions {
            all: false,
            filters: HashMap::from([("name".to_string(), vec![name_filter.to_string()])]),
            ..Default::default()
        };

        let containers = self.client.list_containers(Some(options)).await?;
        tracing::trace!("containers matching {:?}: {}", name_filter, containers.len());

        Ok(containers.into_iter().map(summary_from_docker).collect())
    }

    async fn list_networks(&self, name: &str) -> Result<Vec<NetworkSummary>> {
        let options = ListNetworksOptions {
            filters: HashMap::from([("name".to_string(), vec![name.to_string()])]),
        };

        let networks = self.client.list_networks(Some(options)).await?;
        tracing::trace!("networks matching {:?}: {:?}", name, networks);

        // The engine's name filter matches substrings
        Ok(networks
            .into_iter()
            .map(network_from_docker)
            .filter(|n| n.name == name)
            .collect())
    }

    async fn connect_network(&self, endpoint: &NetworkEndpoint) -> Result<()> {
        let options = ConnectNetworkOptions {
            container: endpoint.container.0.clone(),
            endpoint_config: EndpointSettings {
                aliases: if endpoint.aliases.is_empty() {
                    None
                } else {
                    Some(endpoint.aliases.clone())
                },
                ..Default::default()
            },
        };

        self.client
            .connect_network(&endpoint.network, options)
            .await?;
        Ok(())
    }

    async fn disconnect_network(&self, network: &str, container: &ContainerId) -> Result<()> {
        let options = DisconnectNetworkOptions {
            container: container.0.clone(),
            force: false,
        };

        self.client.disconnect_network(network, options).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .ping()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;
        Ok(())
    }
}

fn summary_from_docker(c: DockerContainerSummary) -> ContainerSummary {
    let mut networks: Vec<String> = c
        .network_settings
        .and_then(|ns| ns.networks)
        .map(|nets| nets.into_keys().collect())
        .unwrap_or_default();
    networks.sort();

    ContainerSummary {
        id: ContainerId::new(c.id.unwrap_or_default()),
        names: c
            .names
            .unwrap_or_default()
            .into_iter()
            .map(|n| n.trim_start_matches('/').to_string())
            .collect(),
        image: c.image.unwrap_or_default(),
        networks,
    }
}

fn network_from_docker(n: Network) -> NetworkSummary {
    NetworkSummary {
        id: n.id.unwrap_or_default(),
        name: n.name.unwrap_or_default(),
        driver: n.driver,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::ContainerSummaryNetworkSettings;

    #[test]
    fn test_summary_strips_leading_slash_and_collects_networks() {
        let raw = DockerContainerSummary {
            id: Some("f00dfeed".to_string()),
            names: Some(vec!["/reward_traefik".to_string()]),
            image: Some("traefik:2.2".to_string()),
            network_settings: Some(ContainerSummaryNetworkSettings {
                networks: Some(HashMap::from([
                    ("reward".to_string(), EndpointSettings::default()),
                    ("shop_default".to_string(), EndpointSettings::default()),
                ])),
            }),
            ..Default::default()
        };

        let summary = summary_from_docker(raw);
        assert_eq!(summary.id, ContainerId::new("f00dfeed"));
        assert_eq!(summary.names, vec!["reward_traefik".to_string()]);
        assert_eq!(summary.image, "traefik:2.2");
        assert_eq!(
            summary.networks,
            vec!["reward".to_string(), "shop_default".to_string()]
        );
    }

    #[test]
    fn test_summary_with_missing_fields() {
        let summary = summary_from_docker(DockerContainerSummary::default());
        assert_eq!(summary.id, ContainerId::new(""));
        assert!(summary.names.is_empty());
        assert!(summary.networks.is_empty());
    }

    #[test]
    fn test_network_from_docker() {
        let raw = Network {
            id: Some("abc123".to_string()),
            name: Some("shop_default".to_string()),
            driver: Some("bridge".to_string()),
            ..Default::default()
        };
        let net = network_from_docker(raw);
        assert_eq!(net.name, "shop_default");
        assert_eq!(net.driver.as_deref(), Some("bridge"));
    }
}
