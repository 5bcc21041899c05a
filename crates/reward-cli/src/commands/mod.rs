//! CLI command implementations

mod mesh;
mod tools;

pub use mesh::*;
pub use tools::*;
