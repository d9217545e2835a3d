//! Configuration schema definitions.
//!
//! This module defines the file configuration for the server binary.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::http::Http2Settings;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// TLS material. Absent means plain mode must be requested.
    pub tls: Option<TlsConfig>,

    /// Serve HTTP/2 over plain TCP. Ignored when `tls` is present.
    pub plain: bool,

    /// Cipher suite ranking override.
    pub cipher_suites: Option<Vec<String>>,

    /// ALPN protocol identifier override, most preferred first.
    pub protocols: Option<Vec<String>>,

    /// Prefer the server's cipher order.
    pub honor_cipher_order: bool,

    /// SETTINGS for HTTP/2 connections.
    pub http2: Http2Settings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            tls: None,
            plain: false,
            cipher_suites: None,
            protocols: None,
            honor_cipher_order: true,
            http2: Http2Settings::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8443").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Time allowed for a client to complete the TLS handshake.
    pub handshake_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8443".to_string(),
            max_connections: 10_000,
            handshake_timeout_secs: 10,
        }
    }
}

/// TLS material locations: a certificate/key pair or a single PEM bundle.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to certificate chain file (PEM).
    pub cert_path: Option<String>,

    /// Path to private key file (PEM).
    pub key_path: Option<String>,

    /// Path to a PEM file holding both chain and key.
    pub bundle_path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
