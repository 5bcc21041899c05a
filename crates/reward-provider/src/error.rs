//! Error types for the container engine client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to connect to container engine: {0}")]
    ConnectionError(String),

    #[error("Container engine API error: {0}")]
    Api(#[from] bollard::errors::Error),

    #[error("Container engine error: {0}")]
    RuntimeError(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
