//! Construction options and the frozen server configuration.

use std::time::Duration;

use tracing::Dispatch;

use crate::error::ConfigurationError;
use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::http::Http2Settings;
use crate::negotiation::policy::protocol_list;
use crate::negotiation::CipherPolicy;
use crate::net::{TlsMaterial, TlsPolicy};

/// Default bound on concurrently held connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10_000;

/// Default time a client gets to finish the TLS handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport mode, fixed for the lifetime of a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    /// TLS termination with ALPN negotiation.
    Tls,
    /// Plain TCP, HTTP/2 with prior knowledge.
    PlainTcp,
}

impl std::fmt::Display for ServerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerMode::Tls => f.write_str("tls"),
            ServerMode::PlainTcp => f.write_str("plain"),
        }
    }
}

/// Options accepted by [`Server::new`](crate::Server::new).
///
/// TLS material takes precedence over `plain`. Without either, construction
/// fails: upgrading a plaintext HTTP/1.1 connection is not supported.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Certificate chain and key, or a PEM bundle.
    pub tls: Option<TlsMaterial>,
    /// Serve HTTP/2 over plain TCP.
    pub plain: bool,
    /// Cipher suite ranking; replaces the defaults entirely.
    pub cipher_suites: Option<Vec<String>>,
    /// ALPN identifiers offered, most preferred first; replaces the defaults entirely.
    pub protocols: Option<Vec<String>>,
    /// Prefer the server's cipher order over the client's. Defaults to `true`.
    pub honor_cipher_order: Option<bool>,
    /// SETTINGS advertised on HTTP/2 connections.
    pub http2: Http2Settings,
    pub max_connections: usize,
    pub handshake_timeout: Duration,
    pub event_capacity: usize,
    /// Subscriber for the server's logs. Defaults to the one current at construction.
    pub log: Option<Dispatch>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            tls: None,
            plain: false,
            cipher_suites: None,
            protocols: None,
            honor_cipher_order: None,
            http2: Http2Settings::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            log: None,
        }
    }
}

impl ServerOptions {
    /// TLS mode with the given material.
    pub fn tls(material: TlsMaterial) -> Self {
        Self {
            tls: Some(material),
            ..Self::default()
        }
    }

    /// Plain TCP mode.
    pub fn plain() -> Self {
        Self {
            plain: true,
            ..Self::default()
        }
    }

    pub fn with_cipher_suites<I, S>(mut self, suites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cipher_suites = Some(suites.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protocols = Some(protocols.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_honor_cipher_order(mut self, honor: bool) -> Self {
        self.honor_cipher_order = Some(honor);
        self
    }

    pub fn with_http2_settings(mut self, settings: Http2Settings) -> Self {
        self.http2 = settings;
        self
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_log(mut self, log: impl Into<Dispatch>) -> Self {
        self.log = Some(log.into());
        self
    }

    /// Select the mode and freeze the options.
    pub(crate) fn freeze(self) -> Result<(ServerConfig, Option<TlsMaterial>), ConfigurationError> {
        let log = self
            .log
            .unwrap_or_else(|| tracing::dispatcher::get_default(|current| current.clone()));

        let (mode, tls) = match (self.tls, self.plain) {
            (Some(material), plain) => {
                if plain {
                    tracing::dispatcher::with_default(&log, || {
                        tracing::warn!("Both TLS material and plain mode given; using TLS")
                    });
                }
                let policy = TlsPolicy {
                    ciphers: CipherPolicy::from_override(self.cipher_suites.as_deref()),
                    protocols: protocol_list(self.protocols.as_deref())?,
                    honor_cipher_order: self.honor_cipher_order != Some(false),
                };
                (ServerMode::Tls, Some((material, policy)))
            }
            (None, true) => (ServerMode::PlainTcp, None),
            (None, false) => {
                tracing::dispatcher::with_default(&log, || {
                    tracing::error!("Trying to create HTTP/2 server with upgrade from HTTP/1.1")
                });
                return Err(ConfigurationError::UpgradeNotSupported);
            }
        };

        if self.max_connections == 0 {
            return Err(ConfigurationError::ZeroLimit("max_connections"));
        }
        if self.handshake_timeout.is_zero() {
            return Err(ConfigurationError::ZeroLimit("handshake_timeout"));
        }
        if self.event_capacity == 0 {
            return Err(ConfigurationError::ZeroLimit("event_capacity"));
        }
        self.http2.validate()?;

        let (material, tls_policy) = match tls {
            Some((material, policy)) => (Some(material), Some(policy)),
            None => (None, None),
        };

        let config = ServerConfig {
            mode,
            tls: tls_policy,
            http2: self.http2,
            max_connections: self.max_connections,
            handshake_timeout: self.handshake_timeout,
            event_capacity: self.event_capacity,
            log,
        };
        Ok((config, material))
    }
}

/// Validated configuration, immutable for the server's lifetime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    mode: ServerMode,
    tls: Option<TlsPolicy>,
    http2: Http2Settings,
    max_connections: usize,
    handshake_timeout: Duration,
    event_capacity: usize,
    log: Dispatch,
}

impl ServerConfig {
    pub fn mode(&self) -> ServerMode {
        self.mode
    }

    /// Handshake policy; `None` in plain mode.
    pub fn tls_policy(&self) -> Option<&TlsPolicy> {
        self.tls.as_ref()
    }

    pub fn http2(&self) -> &Http2Settings {
        &self.http2
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    pub fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    pub fn log(&self) -> &Dispatch {
        &self.log
    }
}
