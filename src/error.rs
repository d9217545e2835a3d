//! Error types shared across the server.

use std::net::SocketAddr;

use thiserror::Error;

use crate::net::connection::ConnectionId;
use crate::net::listener::ListenerError;

/// Invalid or missing construction options. The server is never created.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Neither TLS material nor plain mode was requested.
    #[error("HTTP/1.1 -> HTTP/2 upgrade is not supported; provide TLS material or request plain mode")]
    UpgradeNotSupported,

    /// The TLS-only constructor was called without TLS material.
    #[error("a certificate chain with its private key, or a PEM bundle, is required")]
    TlsMaterialRequired,

    /// The certificate chain could not be read.
    #[error("Certificate error: {0}")]
    Certificate(String),

    /// The private key could not be read.
    #[error("Private key error: {0}")]
    PrivateKey(String),

    /// The cipher policy left no suite the crypto provider implements.
    #[error("cipher suite policy selects no supported cipher suite")]
    NoCipherSuites,

    /// The protocol list was empty or contained an empty identifier.
    #[error("protocol identifier list must contain at least one non-empty identifier")]
    EmptyProtocolList,

    /// An HTTP/2 SETTINGS value outside its legal range.
    #[error("invalid HTTP/2 settings: {0}")]
    Http2Settings(String),

    /// A limit that must be positive was zero.
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),

    /// rustls rejected the assembled configuration.
    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),
}

/// The socket was unusable at the moment of handoff.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("socket unusable at dispatch: {0}")]
    SocketUnusable(#[source] std::io::Error),
}

/// Failure reported by a protocol engine after it took the connection.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A per-connection failure, surfaced as a server event.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("{connection_id} ({peer_addr}): TLS handshake failed: {source}")]
    Handshake {
        connection_id: ConnectionId,
        peer_addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("{connection_id} ({peer_addr}): TLS handshake timed out")]
    HandshakeTimeout {
        connection_id: ConnectionId,
        peer_addr: SocketAddr,
    },

    #[error("{connection_id} ({peer_addr}): {source}")]
    Dispatch {
        connection_id: ConnectionId,
        peer_addr: SocketAddr,
        #[source]
        source: DispatchError,
    },

    #[error("{connection_id} ({peer_addr}): {source}")]
    Engine {
        connection_id: ConnectionId,
        peer_addr: SocketAddr,
        #[source]
        source: EngineError,
    },
}

impl ConnectionError {
    /// Connection the failure belongs to.
    pub fn connection_id(&self) -> ConnectionId {
        match self {
            ConnectionError::Handshake { connection_id, .. }
            | ConnectionError::HandshakeTimeout { connection_id, .. }
            | ConnectionError::Dispatch { connection_id, .. }
            | ConnectionError::Engine { connection_id, .. } => *connection_id,
        }
    }
}

/// Errors from driving the server lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("Failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),

    #[error("server is already listening")]
    AlreadyListening,

    #[error("server is closed")]
    Closed,
}
