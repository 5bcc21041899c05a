//! Core logic for reward
//!
//! This crate provides:
//! - A process execution abstraction with a recording mock
//! - Archive member extraction for helper-binary release artifacts
//! - Download and installation of versioned helper binaries
//! - Attaching the shared service containers to environment networks

pub mod archive;
mod error;
pub mod install;
mod mesh;
mod shell;
pub mod util;

pub use archive::{detect_format, Extractor, MemberStream, Platform};
pub use error::*;
pub use install::HelperBinary;
pub use mesh::*;
pub use shell::*;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
