//! Application protocol negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! Server construction
//!     → policy.rs (default cipher suites and ALPN identifiers, overrides)
//!     → rustls ServerConfig (offered once, identical for every handshake)
//!
//! Per accepted TLS connection:
//!     handshake completes → negotiated ALPN id (or none)
//!     → decision.rs (exact match on "h2")
//!     → NegotiationOutcome handed to the dispatcher
//! ```
//!
//! # Design Decisions
//! - Policy tables are immutable statics, copied into the server config
//! - The decision is strict equality; anything else falls back to HTTP/1.x

pub mod decision;
pub mod policy;

pub use decision::{decide, decide_alpn, NegotiationOutcome};
pub use policy::{
    CipherPolicy, DEFAULT_CIPHER_SUITES, DEFAULT_PROTOCOLS, H2, HTTP_1_0, HTTP_1_1,
};

/// Identifier of the multiplexed protocol as negotiated over ALPN.
pub const PROTOCOL_VERSION: &str = H2;
