//! CLI command implementations.

pub mod common;
pub mod config;
pub mod import;
pub mod output;
pub mod resolve;
