//! reward command layer, shared by the binary and its tests

pub mod commands;
