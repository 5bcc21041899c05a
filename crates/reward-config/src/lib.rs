//! Configuration for reward
//!
//! This crate handles:
//! - Global configuration (`~/.config/reward/config.toml`)
//! - Peering settings consumed by the container mesh (service flags, proxy domain)

mod error;
mod global;
mod peering;

pub use error::*;
pub use global::*;
pub use peering::*;
