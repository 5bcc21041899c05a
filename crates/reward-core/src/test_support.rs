//! Test support utilities for reward-core
//!
//! Provides MockEngine and helpers for unit testing the MeshOrchestrator
//! without requiring a running Docker daemon.

use async_trait::async_trait;
use reward_provider::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Records which methods were called on the mock
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ListContainers { name_filter: String },
    ListNetworks { name: String },
    Connect { endpoint: NetworkEndpoint },
    Disconnect { network: String, container: String },
    Ping,
}

/// In-memory container engine
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the other afterwards. Connecting and disconnecting mutate the
/// recorded network membership of the stored containers, and fail the way
/// Docker does when the endpoint already exists or is missing.
#[derive(Clone, Default)]
pub struct MockEngine {
    pub containers: Arc<Mutex<Vec<ContainerSummary>>>,
    pub networks: Arc<Mutex<Vec<NetworkSummary>>>,
    pub calls: Arc<Mutex<Vec<MockCall>>>,
    /// Errors returned by list_containers, keyed by name filter
    pub list_errors: Arc<Mutex<HashMap<String, ProviderError>>>,
    /// Errors returned by connect/disconnect, keyed by container id
    pub connect_errors: Arc<Mutex<HashMap<String, ProviderError>>>,
    /// Error returned by every list_networks call
    pub network_error: Arc<Mutex<Option<ProviderError>>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a running container with a single name
    pub fn with_container(self, id: &str, name: &str) -> Self {
        self.containers
            .lock()
            .unwrap()
            .push(mock_container(id, name, &[]));
        self
    }

    /// Add a running container already attached to `networks`
    pub fn with_attached_container(self, id: &str, name: &str, networks: &[&str]) -> Self {
        self.containers
            .lock()
            .unwrap()
            .push(mock_container(id, name, networks));
        self
    }

    pub fn with_network(self, name: &str) -> Self {
        self.networks.lock().unwrap().push(NetworkSummary {
            id: format!("net_{}", name),
            name: name.to_string(),
            driver: Some("bridge".to_string()),
        });
        self
    }

    pub fn fail_list(self, name_filter: &str, err: ProviderError) -> Self {
        self.list_errors
            .lock()
            .unwrap()
            .insert(name_filter.to_string(), err);
        self
    }

    pub fn fail_connect(self, container_id: &str, err: ProviderError) -> Self {
        self.connect_errors
            .lock()
            .unwrap()
            .insert(container_id.to_string(), err);
        self
    }

    pub fn fail_networks(self, err: ProviderError) -> Self {
        *self.network_error.lock().unwrap() = Some(err);
        self
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Endpoints passed to connect_network, in call order
    pub fn connected_endpoints(&self) -> Vec<NetworkEndpoint> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Connect { endpoint } => Some(endpoint),
                _ => None,
            })
            .collect()
    }

    /// Networks the container with `id` is currently attached to
    pub fn networks_of(&self, id: &str) -> Vec<String> {
        self.containers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id.0 == id)
            .map(|c| c.networks.clone())
            .unwrap_or_default()
    }

    fn connect_error(&self, id: &ContainerId) -> Option<ProviderError> {
        self.connect_errors
            .lock()
            .unwrap()
            .get(&id.0)
            .map(clone_provider_error)
    }
}

/// Clone a ProviderError (thiserror types don't implement Clone)
pub fn clone_provider_error(e: &ProviderError) -> ProviderError {
    match e {
        ProviderError::ConnectionError(s) => ProviderError::ConnectionError(s.clone()),
        ProviderError::RuntimeError(s) => ProviderError::RuntimeError(s.clone()),
        ProviderError::Api(e) => ProviderError::RuntimeError(e.to_string()),
    }
}

/// Create a mock ContainerSummary
pub fn mock_container(id: &str, name: &str, networks: &[&str]) -> ContainerSummary {
    ContainerSummary {
        id: ContainerId::new(id),
        names: vec![name.to_string()],
        image: "mock_image:latest".to_string(),
        networks: networks.iter().map(|n| n.to_string()).collect(),
    }
}

#[async_trait]
impl ContainerEngine for MockEngine {
    async fn list_containers(&self, name_filter: &str) -> Result<Vec<ContainerSummary>> {
        self.record(MockCall::ListContainers {
            name_filter: name_filter.to_string(),
        });
        if let Some(err) = self.list_errors.lock().unwrap().get(name_filter) {
            return Err(clone_provider_error(err));
        }
        Ok(self
            .containers
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.names.iter().any(|n| n.contains(name_filter)))
            .cloned()
            .collect())
    }

    async fn list_networks(&self, name: &str) -> Result<Vec<NetworkSummary>> {
        self.record(MockCall::ListNetworks {
            name: name.to_string(),
        });
        if let Some(err) = self.network_error.lock().unwrap().as_ref() {
            return Err(clone_provider_error(err));
        }
        Ok(self
            .networks
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.name == name)
            .cloned()
            .collect())
    }

    async fn connect_network(&self, endpoint: &NetworkEndpoint) -> Result<()> {
        self.record(MockCall::Connect {
            endpoint: endpoint.clone(),
        });
        if let Some(err) = self.connect_error(&endpoint.container) {
            return Err(err);
        }

        let mut containers = self.containers.lock().unwrap();
        let container = containers
            .iter_mut()
            .find(|c| c.id == endpoint.container)
            .ok_or_else(|| ProviderError::RuntimeError(format!("No such container: {}", endpoint.container)))?;
        if container.is_attached_to(&endpoint.network) {
            return Err(ProviderError::RuntimeError(format!(
                "endpoint with name {} already exists in network {}",
                container.display_name(),
                endpoint.network
            )));
        }
        container.networks.push(endpoint.network.clone());
        Ok(())
    }

    async fn disconnect_network(&self, network: &str, container: &ContainerId) -> Result<()> {
        self.record(MockCall::Disconnect {
            network: network.to_string(),
            container: container.0.clone(),
        });
        if let Some(err) = self.connect_error(container) {
            return Err(err);
        }

        let mut containers = self.containers.lock().unwrap();
        let summary = containers
            .iter_mut()
            .find(|c| &c.id == container)
            .ok_or_else(|| ProviderError::RuntimeError(format!("No such container: {}", container)))?;
        if !summary.is_attached_to(network) {
            return Err(ProviderError::RuntimeError(format!(
                "container {} is not connected to network {}",
                container, network
            )));
        }
        summary.networks.retain(|n| n != network);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.record(MockCall::Ping);
        Ok(())
    }
}
