//! End-to-end tests for the mesh queries against a real Docker daemon.
//!
//! Only read-only queries are exercised, so running containers and networks
//! are left untouched. Tests skip gracefully if no daemon is reachable.

use reward_config::{GlobalConfig, PeeringConfig};
use reward_core::{CoreError, MeshOrchestrator};
use reward_provider::create_engine;

/// Connect to the daemon configured by `REWARD_TEST_DOCKER_SOCKET` or the
/// platform default
async fn get_test_mesh() -> Option<MeshOrchestrator> {
    let mut config = GlobalConfig::default();
    if let Ok(socket) = std::env::var("REWARD_TEST_DOCKER_SOCKET") {
        config.docker.socket = socket;
    }

    let engine = create_engine(&config).await.ok()?;
    engine.ping().await.ok()?;
    Some(MeshOrchestrator::new(engine, PeeringConfig::default()))
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_e2e_default_bridge_network_exists() {
    let mesh = match get_test_mesh().await {
        Some(m) => m,
        None => {
            eprintln!("Skipping test: no Docker daemon available");
            return;
        }
    };

    assert!(mesh.network_exists("bridge").await.unwrap());
    assert!(!mesh
        .network_exists("reward-e2e-surely-missing-network")
        .await
        .unwrap());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_e2e_missing_container() {
    let mesh = match get_test_mesh().await {
        Some(m) => m,
        None => {
            eprintln!("Skipping test: no Docker daemon available");
            return;
        }
    };

    let err = mesh
        .find_container_by_name("reward-e2e-surely-missing-container")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ContainerNotFound(_)));
    assert!(!mesh
        .is_container_running("reward-e2e-surely-missing-container")
        .await
        .unwrap());
}
