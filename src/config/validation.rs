//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits and timeouts > 0, address parses)
//! - Detect conflicting TLS material selections
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::Config;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }
    if config.listener.handshake_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.handshake_timeout_secs", "must be greater than 0"));
    }

    match &config.tls {
        Some(tls) => {
            let pair = (tls.cert_path.is_some(), tls.key_path.is_some());
            match (pair, tls.bundle_path.is_some()) {
                ((true, true), false) | ((false, false), true) => {}
                ((false, false), false) => errors.push(ValidationError::new(
                    "tls",
                    "requires cert_path and key_path, or bundle_path",
                )),
                (_, true) => errors.push(ValidationError::new(
                    "tls",
                    "cert_path/key_path and bundle_path are mutually exclusive",
                )),
                (_, false) => errors.push(ValidationError::new(
                    "tls",
                    "cert_path and key_path must be given together",
                )),
            }
        }
        None if !config.plain => errors.push(ValidationError::new(
            "tls",
            "HTTP/1.1 -> HTTP/2 upgrade is not supported; configure [tls] or set plain = true",
        )),
        None => {}
    }

    if let Some(protocols) = &config.protocols {
        if protocols.is_empty() || protocols.iter().any(|p| p.is_empty()) {
            errors.push(ValidationError::new("protocols", "must list at least one non-empty identifier"));
        }
    }
    if let Some(suites) = &config.cipher_suites {
        if suites.iter().all(|s| s.starts_with('!')) {
            errors.push(ValidationError::new("cipher_suites", "must select at least one cipher suite"));
        }
    }

    if let Err(e) = config.http2.validate() {
        errors.push(ValidationError::new("http2", e.to_string()));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level {:?}", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
