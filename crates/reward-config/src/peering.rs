//! Settings for the shared ("peered") service containers

use serde::Deserialize;
use std::collections::HashMap;

/// Peering settings consumed by the container mesh
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PeeringConfig {
    /// Register the proxy domains as DNS aliases of the reverse proxy on each
    /// environment network, so app containers reach themselves through it.
    pub resolve_domain_to_proxy: bool,
    /// Base domain served by the reverse proxy
    pub domain: String,
    /// Optional sub-domain prepended to `domain`
    pub subdomain: Option<String>,
    /// Explicit per-service enable flags; absent means "use the service default"
    pub services: HashMap<String, bool>,
}

impl Default for PeeringConfig {
    fn default() -> Self {
        Self {
            resolve_domain_to_proxy: true,
            domain: "reward.test".to_string(),
            subdomain: None,
            services: HashMap::new(),
        }
    }
}

impl PeeringConfig {
    /// Service flag, treating an absent entry as enabled
    pub fn service_enabled_permissive(&self, name: &str) -> bool {
        self.services.get(name).copied().unwrap_or(true)
    }

    /// Service flag, treating an absent entry as disabled
    pub fn service_enabled_strict(&self, name: &str) -> bool {
        self.services.get(name).copied().unwrap_or(false)
    }

    /// `subdomain.domain`, or just `domain` when no sub-domain is set
    pub fn full_domain(&self) -> String {
        match self.subdomain.as_deref() {
            Some(sub) if !sub.is_empty() => format!("{}.{}", sub, self.domain),
            _ => self.domain.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_and_strict_defaults() {
        let mut config = PeeringConfig::default();
        assert!(config.service_enabled_permissive("mailhog"));
        assert!(!config.service_enabled_strict("adminer"));

        config.services.insert("mailhog".to_string(), false);
        config.services.insert("adminer".to_string(), true);
        assert!(!config.service_enabled_permissive("mailhog"));
        assert!(config.service_enabled_strict("adminer"));
    }

    #[test]
    fn test_full_domain() {
        let mut config = PeeringConfig {
            domain: "reward.test".to_string(),
            ..Default::default()
        };
        assert_eq!(config.full_domain(), "reward.test");

        config.subdomain = Some(String::new());
        assert_eq!(config.full_domain(), "reward.test");

        config.subdomain = Some("shop".to_string());
        assert_eq!(config.full_domain(), "shop.reward.test");
    }
}
