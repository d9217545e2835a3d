//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → tls.rs (TLS handshake with ALPN, TLS mode only)
//!     → connection.rs (connection id, transport health check)
//!     → Hand off to the dispatcher
//!
//! Connection States:
//!     Accepting → Handshaking → Dispatched
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Dispatched connections belong to their engine; nothing here tracks them
//! - The rustls config is built once and shared by every handshake

pub mod connection;
pub mod listener;
pub mod tls;

pub use connection::{BoxedTransport, ConnectionId, Transport};
pub use listener::{ConnectionPermit, Listener, ListenerError};
pub use tls::{build_tls_acceptor, TlsMaterial, TlsPolicy};
