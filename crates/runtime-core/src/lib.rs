//! Runtime Core - shared foundation for the controller and worker processes
//!
//! Provides the error taxonomy, cluster configuration, and wire types
//! shared by the controller and worker binaries.

pub mod config;
pub mod error;
pub mod types;

pub use config::ClusterConfig;
pub use error::{Error, Result};
pub use types::*;
