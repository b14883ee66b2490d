//! Shared configuration library for Trove.
//!
//! Centralizes config defaults, file/env loading and guard-rail validation so
//! the core and `trovectl` agree on a single source of truth.

#![allow(missing_docs)]

pub mod error;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use error::ConfigLoadError;
pub use loader::{ClientConfigSource, ConfigLoad, load_env_file};
pub use models::{ApiConfig, ClientConfig, CommitConfig, LoggingConfig, MediaConfig};
pub use validation::ConfigGuardRailError;
