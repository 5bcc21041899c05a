//! Container engine client for reward
//!
//! This crate provides the narrow slice of the container engine API that the
//! network mesh needs: name-filtered listings of containers and networks, and
//! attaching/detaching a container to/from a network.

mod docker;
mod error;
mod types;

pub use docker::DockerEngine;
pub use error::*;
pub use types::*;

use async_trait::async_trait;

/// Trait for container engine clients
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// List running containers whose name contains `name_filter`, in engine order
    async fn list_containers(&self, name_filter: &str) -> Result<Vec<ContainerSummary>>;

    /// List networks named exactly `name`
    async fn list_networks(&self, name: &str) -> Result<Vec<NetworkSummary>>;

    /// Attach a container to a network, registering the endpoint's aliases
    async fn connect_network(&self, endpoint: &NetworkEndpoint) -> Result<()>;

    /// Detach a container from a network
    async fn disconnect_network(&self, network: &str, container: &ContainerId) -> Result<()>;

    /// Check if the engine is reachable
    async fn ping(&self) -> Result<()>;
}

/// Create the Docker engine client configured in the global config
pub async fn create_engine(
    config: &reward_config::GlobalConfig,
) -> Result<Box<dyn ContainerEngine>> {
    let socket = &config.docker.socket;
    match DockerEngine::new(socket).await {
        Ok(engine) => Ok(Box::new(engine)),
        Err(e) => {
            let socket_path = socket.trim_start_matches("unix://");
            let socket_exists = socket.starts_with("http") || std::path::Path::new(socket_path).exists();
            Err(ProviderError::ConnectionError(format_connection_error(
                socket,
                socket_exists,
                &e,
            )))
        }
    }
}

/// Format a helpful connection error message with actionable instructions
fn format_connection_error(socket: &str, socket_exists: bool, underlying: &ProviderError) -> String {
    let mut msg = String::from("Cannot connect to Docker\n\n");

    if !socket_exists {
        msg.push_str(&format!(
            "The Docker API socket was not found at:\n  {}\n\n",
            socket
        ));
        msg.push_str("To start Docker, run:\n");
        msg.push_str("  sudo systemctl enable --now docker\n");
    } else {
        msg.push_str(&format!(
            "The socket exists at {} but the daemon is not responding.\n\n",
            socket
        ));
        msg.push_str(&format!("Underlying error: {}\n", underlying));
    }

    msg
}
