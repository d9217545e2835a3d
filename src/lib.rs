//! HTTP/2 server with per-connection protocol negotiation.
//!
//! A TLS server offers `h2`, `http/1.1` and `http/1.0` over ALPN and hands
//! each connection to the HTTP/2 engine only when the handshake settled on
//! exactly `h2`; everything else is served as HTTP/1.x. A plain-TCP server
//! speaks HTTP/2 with prior knowledge on every connection.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod http;
pub mod lifecycle;
pub mod negotiation;
pub mod net;
pub mod observability;
pub mod server;

pub use error::{ConfigurationError, ConnectionError, DispatchError, EngineError, ServerError};
pub use events::{ConnectionInfo, RequestEvent, ServerEvent};
pub use http::Http2Settings;
pub use negotiation::{decide, NegotiationOutcome, PROTOCOL_VERSION};
pub use net::TlsMaterial;
pub use server::{create_server, Server, ServerMode, ServerOptions, ServerState};
