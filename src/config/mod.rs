//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! devproxy.toml (or built-in defaults)
//!     → loader.rs (read & deserialize into ConfigFile)
//!     → CLI overrides applied to ConfigFile
//!     → validation.rs (semantic checks, env lookup, path resolution)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc with the router and server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All file fields have defaults, so an empty file yields the stock setup
//! - Any error is fatal before a socket is bound

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AliasRule, ConfigFile, ObservabilityConfig, ProxyRule, ServerConfig, UpstreamConfig,
};
pub use validation::ValidationError;
