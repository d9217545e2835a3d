//! Connection identity and transport health.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing and events
//! - Abstract over the byte streams handed to protocol engines
//!   (plain TCP, TLS over TCP, in-memory pipes)
//! - Report whether a socket is still usable at dispatch time

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncRead, AsyncWrite, DuplexStream};
use tokio::net::TcpStream;
use tokio_rustls::server::TlsStream;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A bidirectional byte stream an engine can take ownership of.
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    /// Fails if the socket is already closed or carries a pending error.
    fn check(&self) -> std::io::Result<()>;
}

/// Type-erased transport, as handed to engines.
pub type BoxedTransport = Box<dyn Transport>;

impl Transport for TcpStream {
    fn check(&self) -> std::io::Result<()> {
        if let Some(e) = self.take_error()? {
            return Err(e);
        }
        // ENOTCONN once the peer reset the connection
        self.peer_addr().map(|_| ())
    }
}

impl Transport for TlsStream<TcpStream> {
    fn check(&self) -> std::io::Result<()> {
        let (tcp, session) = self.get_ref();
        if session.is_handshaking() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "TLS session not established",
            ));
        }
        tcp.check()
    }
}

impl Transport for DuplexStream {
    fn check(&self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn check(&self) -> std::io::Result<()> {
        (**self).check()
    }
}
