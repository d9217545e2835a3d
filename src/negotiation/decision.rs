//! Negotiation decision: which engine receives a connection.
//!
//! A peer that negotiated anything other than exactly `h2` (another
//! identifier, an empty one, or nothing at all) is served HTTP/1.x. Promoting
//! such a peer to HTTP/2 would leave the two ends disagreeing on the protocol.

use crate::negotiation::policy::H2;

/// Per-connection classification result steering dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationOutcome {
    /// Serve the connection with the HTTP/2 engine.
    Multiplexed,
    /// Serve the connection with the HTTP/1.x engine.
    Legacy,
}

impl NegotiationOutcome {
    /// Short label used in logs and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationOutcome::Multiplexed => "h2",
            NegotiationOutcome::Legacy => "http/1.x",
        }
    }
}

impl std::fmt::Display for NegotiationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a connection by the protocol identifier its handshake settled on.
pub fn decide(negotiated: Option<&str>) -> NegotiationOutcome {
    match negotiated {
        Some(protocol) if protocol == H2 => NegotiationOutcome::Multiplexed,
        _ => NegotiationOutcome::Legacy,
    }
}

/// Same as [`decide`], for the raw ALPN bytes reported by the TLS layer.
///
/// Identifiers that are not valid UTF-8 can never equal `h2`.
pub fn decide_alpn(alpn: Option<&[u8]>) -> NegotiationOutcome {
    decide(alpn.and_then(|bytes| std::str::from_utf8(bytes).ok()))
}
