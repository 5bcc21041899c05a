//! Error types for reward-core

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] reward_config::ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] reward_provider::ProviderError),

    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("Unsupported action: {0} (expected connect or disconnect)")]
    UnsupportedAction(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Too many containers match {name}: {}", .candidates.join(", "))]
    ContainerAmbiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error("Failed to query network {network}: {source}")]
    NetworkQuery {
        network: String,
        #[source]
        source: reward_provider::ProviderError,
    },

    #[error("Download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Failures of an external process run through a [`crate::Shell`]
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} {}", describe_exit(.code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        /// Captured output, when capture was enabled
        output: Option<Vec<u8>>,
    },

    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ShellError {
    /// Captured output of a failed run, if any
    pub fn output(&self) -> Option<&[u8]> {
        match self {
            Self::NonZeroExit { output, .. } => output.as_deref(),
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

/// Failures while resolving or extracting archive members
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("{}", describe_missing_member(.wanted, .archive, .found))]
    MemberNotFound {
        wanted: String,
        archive: String,
        /// The single recorded name that was checked, for formats that carry one
        found: Option<String>,
    },

    #[error("Illegal file path in archive: {entry} escapes {}", .dest.display())]
    PathEscape { entry: String, dest: PathBuf },

    #[error("Zip member {name} declares {size} bytes, more than can be buffered")]
    MemberTooLarge { name: String, size: u64 },

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_missing_member(wanted: &str, archive: &str, found: &Option<String>) -> String {
    match found {
        Some(found) => format!(
            "File name '{}' does not match command '{}' found in {}",
            found, wanted, archive
        ),
        None => format!("File named '{}' is not found in {}", wanted, archive),
    }
}
