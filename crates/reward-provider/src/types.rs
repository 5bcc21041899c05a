//! Common types for the container engine client

/// Container ID wrapper
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        if self.0.len() > 12 {
            &self.0[..12]
        } else {
            &self.0
        }
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContainerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A running container as returned by a name-filtered listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: ContainerId,
    /// Container names without the leading `/`
    pub names: Vec<String>,
    pub image: String,
    /// Names of the networks the container is currently attached to
    pub networks: Vec<String>,
}

impl ContainerSummary {
    /// First name, or the short ID when the engine reported none
    pub fn display_name(&self) -> &str {
        self.names
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| self.id.short())
    }

    pub fn is_attached_to(&self, network: &str) -> bool {
        self.networks.iter().any(|n| n == network)
    }
}

/// A network as returned by a name query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSummary {
    pub id: String,
    pub name: String,
    pub driver: Option<String>,
}

/// One container's endpoint on one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkEndpoint {
    pub network: String,
    pub container: ContainerId,
    /// DNS aliases for the container, resolvable only on `network`
    pub aliases: Vec<String>,
}

impl NetworkEndpoint {
    pub fn new(network: impl Into<String>, container: ContainerId) -> Self {
        Self {
            network: network.into(),
            container,
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }
}
