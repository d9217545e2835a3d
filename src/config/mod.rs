//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Config (validated, immutable)
//!     → loader::server_options (reads TLS files)
//!     → ServerOptions → Server::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the negotiation policy never changes
//!   while a server runs
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, server_options, ConfigError};
pub use schema::{Config, ListenerConfig, ObservabilityConfig, TlsConfig};
